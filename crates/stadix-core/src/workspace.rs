//! All screens of one session

use std::collections::HashMap;

use stadix_client::{StatRequest, StatsService, UploadKind};
use stadix_io::UploadFile;
use stadix_stats::Distribution;
use tracing::{info, warn};

use crate::error::{CoreError, CoreResult};
use crate::panel::{DistributionKind, HypothesisMode, Panel, Screen};

/// One panel per screen plus the selected sub-modes
#[derive(Debug, Clone)]
pub struct Workspace {
    panels: HashMap<Screen, Panel>,
    hypothesis_mode: HypothesisMode,
    distribution: DistributionKind,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            panels: Screen::ALL
                .iter()
                .map(|&screen| (screen, Panel::new(screen)))
                .collect(),
            hypothesis_mode: HypothesisMode::default(),
            distribution: DistributionKind::default(),
        }
    }

    pub fn panel(&self, screen: Screen) -> &Panel {
        &self.panels[&screen]
    }

    pub fn panel_mut(&mut self, screen: Screen) -> &mut Panel {
        self.panels
            .entry(screen)
            .or_insert_with(|| Panel::new(screen))
    }

    pub fn hypothesis_mode(&self) -> HypothesisMode {
        self.hypothesis_mode
    }

    pub fn distribution(&self) -> DistributionKind {
        self.distribution
    }

    /// Switch the hypothesis test. A different test clears the panel.
    pub fn set_hypothesis_mode(&mut self, mode: HypothesisMode) {
        if self.hypothesis_mode != mode {
            self.hypothesis_mode = mode;
            self.panel_mut(Screen::Hypothesis).reset();
        }
    }

    /// Switch the distribution. A different distribution clears the panel.
    pub fn set_distribution(&mut self, kind: DistributionKind) {
        if self.distribution != kind {
            self.distribution = kind;
            self.panel_mut(Screen::Probability).reset();
        }
    }

    /// Submit a request from `screen` and wait for the result
    pub async fn run<S: StatsService>(
        &mut self,
        service: &S,
        screen: Screen,
        request: StatRequest,
    ) -> CoreResult<&Panel> {
        let expected = Screen::for_operation(request.operation());
        if expected != screen {
            return Err(CoreError::WrongScreen {
                operation: request.operation().to_string(),
                expected,
                screen,
            });
        }

        if let Some(mode) = HypothesisMode::for_request(&request) {
            self.set_hypothesis_mode(mode);
        }
        if let Some(kind) = DistributionKind::for_request(&request) {
            self.set_distribution(kind);
        }

        let series = distribution_for(&request).and_then(|dist| match dist.synthesize() {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(error = %e, "no chart for these parameters");
                None
            }
        });

        let token = self.panel_mut(screen).begin_with(request.clone());
        info!(%screen, operation = %request.operation(), "running analysis");
        let result = service.send(&request).await;

        let panel = self.panel_mut(screen);
        if panel.complete(token, result) {
            if let Some(series) = series {
                panel.attach_series(token, series);
            }
        }
        Ok(panel)
    }

    /// Upload a spreadsheet for the descriptive or regression screen
    pub async fn upload<S: StatsService>(
        &mut self,
        service: &S,
        kind: UploadKind,
        file: &UploadFile,
    ) -> CoreResult<&Panel> {
        let screen = Screen::for_operation(kind.operation());
        let token = self.panel_mut(screen).begin_upload(file.file_name.clone());
        info!(%screen, file = %file.file_name, "uploading file");
        let result = service.upload(kind, file).await;

        let panel = self.panel_mut(screen);
        panel.complete(token, result);
        Ok(panel)
    }
}

/// Chart parameters for a probability request
pub fn distribution_for(request: &StatRequest) -> Option<Distribution> {
    match request {
        StatRequest::Binomial(r) => Some(Distribution::Binomial {
            n: r.n,
            p: r.p,
            k: r.k,
        }),
        StatRequest::Poisson(r) => Some(Distribution::Poisson {
            lambda: r.lambda,
            k: r.k,
        }),
        StatRequest::Normal(r) => Some(Distribution::Normal {
            mean: r.mean,
            std_dev: r.std_dev,
            x: r.x,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelState;

    #[test]
    fn test_mode_switch_resets_panel() {
        let mut workspace = Workspace::new();
        let panel = workspace.panel_mut(Screen::Hypothesis);
        let token = panel.begin();

        workspace.set_hypothesis_mode(HypothesisMode::OneSample);
        assert!(workspace.panel(Screen::Hypothesis).is_loading());

        workspace.set_hypothesis_mode(HypothesisMode::Anova);
        assert_eq!(workspace.panel(Screen::Hypothesis).state(), &PanelState::Idle);
        assert!(!workspace
            .panel_mut(Screen::Hypothesis)
            .complete(token, Err(stadix_client::ClientError::Timeout)));
    }

    #[test]
    fn test_distribution_for_requests() {
        let request = StatRequest::poisson(3.0, 2).unwrap();
        assert_eq!(
            distribution_for(&request),
            Some(Distribution::Poisson { lambda: 3.0, k: 2 })
        );
        assert!(distribution_for(&StatRequest::descriptive(vec![1.0]).unwrap()).is_none());
    }
}
