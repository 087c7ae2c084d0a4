//! Per-screen view-models
//!
//! Each screen owns one [`Panel`]. A panel tracks the request in flight with
//! a generation counter: [`Panel::begin`] hands out a [`RequestToken`], and
//! [`Panel::complete`] only applies a result whose token is still the latest.
//! A response that arrives after the student resubmitted or switched mode is
//! dropped.

use serde::{Deserialize, Serialize};
use stadix_client::{ClientError, Operation, StatRequest, StatResponse};
use stadix_stats::ChartSeries;
use tracing::debug;

use crate::chart::{chart_series_with, FrequencyChart};
use crate::error::{ExportError, ExportOutcome};
use crate::render::key_values;
use crate::snapshot::ChartSnapshot;

/// Screens of the learning tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Descriptive,
    Regression,
    Hypothesis,
    ChiSquare,
    Sampling,
    Probability,
    Variables,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Descriptive,
        Screen::Regression,
        Screen::Hypothesis,
        Screen::ChiSquare,
        Screen::Sampling,
        Screen::Probability,
        Screen::Variables,
    ];

    /// Screen that owns an operation
    pub fn for_operation(operation: Operation) -> Self {
        match operation {
            Operation::DescriptiveBasic | Operation::DescriptiveUpload => Screen::Descriptive,
            Operation::Regression | Operation::RegressionUpload => Screen::Regression,
            Operation::TTestOneSample | Operation::TTestIndependent | Operation::Anova => {
                Screen::Hypothesis
            }
            Operation::ChiSquare => Screen::ChiSquare,
            Operation::SampleSize => Screen::Sampling,
            Operation::Binomial | Operation::Poisson | Operation::Normal => Screen::Probability,
            Operation::ClassifyVariable => Screen::Variables,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Descriptive => "Descriptive",
            Screen::Regression => "Regression",
            Screen::Hypothesis => "Hypothesis",
            Screen::ChiSquare => "Chi-Square",
            Screen::Sampling => "Sampling",
            Screen::Probability => "Probability",
            Screen::Variables => "Variables",
        }
    }

    /// File-name friendly identifier
    pub fn slug(&self) -> &'static str {
        match self {
            Screen::Descriptive => "descriptive",
            Screen::Regression => "regression",
            Screen::Hypothesis => "hypothesis",
            Screen::ChiSquare => "chi-square",
            Screen::Sampling => "sampling",
            Screen::Probability => "probability",
            Screen::Variables => "variables",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Test selected on the hypothesis screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisMode {
    #[default]
    OneSample,
    TwoSample,
    Anova,
}

impl HypothesisMode {
    pub fn for_request(request: &StatRequest) -> Option<Self> {
        match request {
            StatRequest::TTestOneSample(_) => Some(HypothesisMode::OneSample),
            StatRequest::TTestIndependent(_) => Some(HypothesisMode::TwoSample),
            StatRequest::Anova(_) => Some(HypothesisMode::Anova),
            _ => None,
        }
    }
}

/// Distribution selected on the probability screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    #[default]
    Binomial,
    Poisson,
    Normal,
}

impl DistributionKind {
    pub fn for_request(request: &StatRequest) -> Option<Self> {
        match request {
            StatRequest::Binomial(_) => Some(DistributionKind::Binomial),
            StatRequest::Poisson(_) => Some(DistributionKind::Poisson),
            StatRequest::Normal(_) => Some(DistributionKind::Normal),
            _ => None,
        }
    }
}

/// Identifies one submission from one panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken {
    screen: Screen,
    generation: u64,
}

impl RequestToken {
    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a panel is currently showing
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Idle,
    Loading { token: RequestToken },
    Ready(StatResponse),
    /// Message for the student
    Failed(String),
}

/// View-model of one screen
#[derive(Debug, Clone)]
pub struct Panel {
    screen: Screen,
    state: PanelState,
    generation: u64,
    request: Option<StatRequest>,
    source: Option<String>,
    frequency_chart: FrequencyChart,
    series: Option<ChartSeries>,
    snapshot: Option<ChartSnapshot>,
}

impl Panel {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            state: PanelState::Idle,
            generation: 0,
            request: None,
            source: None,
            frequency_chart: FrequencyChart::default(),
            series: None,
            snapshot: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PanelState::Loading { .. })
    }

    /// Result on display, if any
    pub fn response(&self) -> Option<&StatResponse> {
        match &self.state {
            PanelState::Ready(response) => Some(response),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PanelState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Inputs of the last submission
    pub fn request(&self) -> Option<&StatRequest> {
        self.request.as_ref()
    }

    /// Name of the uploaded file behind the current result
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn frequency_chart(&self) -> FrequencyChart {
        self.frequency_chart
    }

    /// Choose how a frequency table is drawn. A different kind drops the capture.
    pub fn set_frequency_chart(&mut self, kind: FrequencyChart) {
        if self.frequency_chart != kind {
            self.frequency_chart = kind;
            self.snapshot = None;
        }
    }

    /// Synthesized distribution points, probability screen only
    pub fn series(&self) -> Option<&ChartSeries> {
        self.series.as_ref()
    }

    pub fn snapshot(&self) -> Option<&ChartSnapshot> {
        self.snapshot.as_ref()
    }

    /// Start a submission. Any earlier token stops being current.
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        let token = RequestToken {
            screen: self.screen,
            generation: self.generation,
        };
        self.state = PanelState::Loading { token };
        self.request = None;
        self.source = None;
        self.series = None;
        self.snapshot = None;
        token
    }

    /// Start a submission and remember its inputs for the report
    pub fn begin_with(&mut self, request: StatRequest) -> RequestToken {
        let token = self.begin();
        self.request = Some(request);
        token
    }

    /// Start an upload submission, remembering the file name
    pub fn begin_upload(&mut self, file_name: impl Into<String>) -> RequestToken {
        let token = self.begin();
        self.source = Some(file_name.into());
        token
    }

    fn is_current(&self, token: RequestToken) -> bool {
        token.screen == self.screen
            && token.generation == self.generation
            && matches!(self.state, PanelState::Loading { token: current } if current == token)
    }

    /// Apply a result. Returns false, leaving the panel untouched, when the
    /// token has been superseded.
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: Result<StatResponse, ClientError>,
    ) -> bool {
        if !self.is_current(token) {
            debug!(
                screen = %self.screen,
                token = token.generation,
                current = self.generation,
                "dropping stale response"
            );
            return false;
        }

        self.state = match result {
            Ok(response) => PanelState::Ready(response),
            Err(e) => PanelState::Failed(e.user_message()),
        };
        true
    }

    /// Attach chart points to the result of `token`
    pub fn attach_series(&mut self, token: RequestToken, series: ChartSeries) -> bool {
        if token.generation != self.generation || self.response().is_none() {
            return false;
        }
        self.series = Some(series);
        true
    }

    /// Clear result, inputs and capture. Pending tokens become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = PanelState::Idle;
        self.request = None;
        self.source = None;
        self.series = None;
        self.snapshot = None;
    }

    /// Render the current result's chart into a snapshot for the report
    pub fn capture(&mut self) -> ExportOutcome<&ChartSnapshot> {
        self.capture_sized(ChartSnapshot::DEFAULT_WIDTH, ChartSnapshot::DEFAULT_HEIGHT)
    }

    pub fn capture_sized(&mut self, width: u32, height: u32) -> ExportOutcome<&ChartSnapshot> {
        let response = self
            .response()
            .ok_or(ExportError::NoResult { screen: self.screen })?;

        let snapshot = match chart_series_with(response, self.series.as_ref(), self.frequency_chart) {
            Some(chart) => ChartSnapshot::chart(response.title(), &chart, width, height),
            None => ChartSnapshot::card(response.title(), &key_values(response), width, height),
        };
        debug!(screen = %self.screen, bytes = snapshot.svg.len(), "chart captured");

        Ok(self.snapshot.insert(snapshot))
    }

    /// A report can be exported once a result is shown and captured
    pub fn can_export(&self) -> bool {
        self.response().is_some() && self.snapshot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stadix_client::{DiscreteProbability, NormalProbability};

    fn normal() -> StatResponse {
        StatResponse::Normal(NormalProbability {
            prob_left: 0.8413,
            prob_right: 0.1587,
            z_score: 1.0,
        })
    }

    #[test]
    fn test_begin_complete() {
        let mut panel = Panel::new(Screen::Probability);
        let token = panel.begin();
        assert!(panel.is_loading());
        assert!(panel.complete(token, Ok(normal())));
        assert!(panel.response().is_some());
    }

    #[test]
    fn test_stale_token_dropped() {
        let mut panel = Panel::new(Screen::Probability);
        let first = panel.begin();
        let second = panel.begin();

        let late = StatResponse::Binomial(DiscreteProbability {
            prob_exact: 0.2,
            prob_accumulated: 0.5,
            expected_value: 5.0,
        });
        assert!(!panel.complete(first, Ok(late)));
        assert!(panel.is_loading());

        assert!(panel.complete(second, Ok(normal())));
        assert_eq!(panel.response(), Some(&normal()));

        // A token can only be applied once
        assert!(!panel.complete(second, Ok(normal())));
    }

    #[test]
    fn test_reset_invalidates_pending() {
        let mut panel = Panel::new(Screen::Hypothesis);
        let token = panel.begin();
        panel.reset();
        assert!(!panel.complete(token, Ok(normal())));
        assert_eq!(panel.state(), &PanelState::Idle);
    }

    #[test]
    fn test_failure_keeps_message() {
        let mut panel = Panel::new(Screen::Probability);
        let token = panel.begin();
        panel.complete(token, Err(ClientError::service(400, "k must not exceed n")));
        assert_eq!(panel.error(), Some("k must not exceed n"));
        assert!(!panel.can_export());
    }

    #[test]
    fn test_token_from_other_screen_rejected() {
        let mut a = Panel::new(Screen::Descriptive);
        let mut b = Panel::new(Screen::Regression);
        let token_a = a.begin();
        b.begin();
        assert!(!b.complete(token_a, Ok(normal())));
    }

    #[test]
    fn test_capture_requires_result() {
        let mut panel = Panel::new(Screen::Sampling);
        assert!(matches!(
            panel.capture(),
            Err(ExportError::NoResult { screen: Screen::Sampling })
        ));

        let token = panel.begin();
        panel.complete(token, Ok(normal()));
        assert!(!panel.can_export());
        panel.capture().unwrap();
        assert!(panel.can_export());

        // A new submission discards the old capture
        panel.begin();
        assert!(!panel.can_export());
    }

    #[test]
    fn test_new_submission_forgets_old_inputs() {
        let mut panel = Panel::new(Screen::Descriptive);
        panel.begin_with(StatRequest::descriptive(vec![1.0, 2.0, 3.0]).unwrap());
        assert!(panel.request().is_some());

        panel.begin_upload("grades.csv");
        assert!(panel.request().is_none());
        assert_eq!(panel.source(), Some("grades.csv"));

        panel.begin();
        assert!(panel.source().is_none());
    }

    #[test]
    fn test_changing_frequency_chart_drops_capture() {
        let mut panel = Panel::new(Screen::Probability);
        let token = panel.begin();
        panel.complete(token, Ok(normal()));
        panel.capture().unwrap();

        panel.set_frequency_chart(FrequencyChart::Bars);
        assert!(panel.can_export());
        panel.set_frequency_chart(FrequencyChart::Pie);
        assert!(!panel.can_export());
        assert_eq!(panel.frequency_chart(), FrequencyChart::Pie);
    }

    #[test]
    fn test_every_operation_has_a_screen() {
        for op in Operation::ALL {
            let screen = Screen::for_operation(op);
            assert!(Screen::ALL.contains(&screen));
        }
    }
}
