//! Workspace and export tests against a fake statistics service

use std::future::Future;
use std::sync::Mutex;

use stadix_client::{
    ClientError, ClientResult, DiscreteProbability, NormalProbability, OneSampleTTestResponse,
    Operation, SampleSizeResponse, StatRequest, StatResponse, StatsService, UploadKind,
};
use stadix_core::{
    CoreError, ExportConfig, ExportError, ExportFormat, FrequencyChart, HypothesisMode, PanelState,
    ReportExporter, Screen, Workspace,
};
use stadix_io::UploadFile;

/// Answers from a fixed queue and records what it was sent
#[derive(Default)]
struct FakeService {
    replies: Mutex<Vec<ClientResult<StatResponse>>>,
    sent: Mutex<Vec<StatRequest>>,
}

impl FakeService {
    fn replying(replies: Vec<ClientResult<StatResponse>>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn next(&self) -> ClientResult<StatResponse> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(ClientError::Connection("no reply queued".to_string())))
    }
}

impl StatsService for FakeService {
    fn send(&self, request: &StatRequest) -> impl Future<Output = ClientResult<StatResponse>> + Send {
        self.sent.lock().unwrap().push(request.clone());
        let reply = self.next();
        async move { reply }
    }

    fn upload(
        &self,
        _kind: UploadKind,
        _file: &UploadFile,
    ) -> impl Future<Output = ClientResult<StatResponse>> + Send {
        let reply = self.next();
        async move { reply }
    }
}

fn binomial_reply() -> StatResponse {
    StatResponse::Binomial(DiscreteProbability {
        prob_exact: 0.246_093_75,
        prob_accumulated: 0.623_046_875,
        expected_value: 5.0,
    })
}

fn sample_size_reply() -> StatResponse {
    StatResponse::SampleSize(SampleSizeResponse {
        sample_size: 385,
        z_score: 1.96,
        q_value: 0.5,
        formula: "n = Z^2 p q / e^2".to_string(),
        is_finite: false,
    })
}

fn descriptive_reply() -> StatResponse {
    let body = serde_json::json!({
        "summary_stats": {
            "n": 4, "mean": 5.0, "median": 5.0, "mode": [], "variance": 6.67,
            "std_dev": 2.58, "range": 6.0, "coeff_variation": 51.6,
            "min": 2.0, "max": 8.0, "q1": 3.0, "q3": 7.0
        },
        "frequency_table": [
            {"lower_limit": 2.0, "upper_limit": 5.0, "class_mark": 3.5,
             "absolute_freq": 2, "cumulative_freq": 2, "relative_freq": 0.5, "percentage": 50.0},
            {"lower_limit": 5.0, "upper_limit": 8.0, "class_mark": 6.5,
             "absolute_freq": 2, "cumulative_freq": 4, "relative_freq": 0.5, "percentage": 50.0}
        ]
    });
    StatResponse::parse(Operation::DescriptiveBasic, &body.to_string()).unwrap()
}

fn t_test_reply() -> StatResponse {
    StatResponse::TTestOneSample(OneSampleTTestResponse {
        statistic: 2.5,
        p_value: 0.03,
        sample_mean: 5.4,
        theoretical_mean: 5.0,
        interpretation: "The null hypothesis is rejected.".to_string(),
    })
}

#[tokio::test]
async fn test_probability_run_attaches_series() {
    let service = FakeService::replying(vec![Ok(binomial_reply())]);
    let mut workspace = Workspace::new();

    let panel = workspace
        .run(&service, Screen::Probability, StatRequest::binomial(10, 0.5, 5).unwrap())
        .await
        .unwrap();

    assert!(panel.response().is_some());
    let series = panel.series().expect("series attached");
    assert_eq!(series.len(), 11);
    assert_eq!(series.mode(), Some(5));
}

#[tokio::test]
async fn test_wrong_screen_is_rejected_before_sending() {
    let service = FakeService::default();
    let mut workspace = Workspace::new();

    let err = workspace
        .run(&service, Screen::Sampling, StatRequest::binomial(10, 0.5, 5).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::WrongScreen { expected: Screen::Probability, .. }));
    assert!(service.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_service_failure_shows_message() {
    let service = FakeService::replying(vec![Err(ClientError::service(400, "p must be between 0 and 1"))]);
    let mut workspace = Workspace::new();

    let panel = workspace
        .run(&service, Screen::Probability, StatRequest::binomial(10, 0.5, 5).unwrap())
        .await
        .unwrap();
    assert_eq!(panel.error(), Some("p must be between 0 and 1"));
    assert!(panel.series().is_none());
}

#[tokio::test]
async fn test_switching_test_clears_previous_result() {
    let service = FakeService::replying(vec![Ok(t_test_reply())]);
    let mut workspace = Workspace::new();

    workspace
        .run(
            &service,
            Screen::Hypothesis,
            StatRequest::t_test_one_sample(vec![5.0, 5.5, 5.7], 5.0).unwrap(),
        )
        .await
        .unwrap();
    assert!(workspace.panel(Screen::Hypothesis).response().is_some());

    workspace.set_hypothesis_mode(HypothesisMode::Anova);
    assert_eq!(workspace.panel(Screen::Hypothesis).state(), &PanelState::Idle);
}

#[test]
fn test_late_response_is_dropped() {
    let mut workspace = Workspace::new();
    let panel = workspace.panel_mut(Screen::Probability);

    let slow = panel.begin();
    let fast = panel.begin();

    assert!(panel.complete(fast, Ok(binomial_reply())));
    let late = StatResponse::Normal(NormalProbability {
        prob_left: 0.5,
        prob_right: 0.5,
        z_score: 0.0,
    });
    assert!(!panel.complete(slow, Ok(late)));
    assert_eq!(panel.response(), Some(&binomial_reply()));
}

#[test]
fn test_export_disallowed_before_result_on_every_screen() {
    let workspace = Workspace::new();
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path()).with_name("report");

    for screen in Screen::ALL {
        let panel = workspace.panel(screen);
        assert!(!panel.can_export(), "{screen} should not be exportable");
        let err = ReportExporter::new().export(panel, &config).unwrap_err();
        assert!(matches!(err, ExportError::NoResult { screen: s } if s == screen));
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_export_requires_capture_then_writes_bundle() {
    let service = FakeService::replying(vec![Ok(sample_size_reply())]);
    let mut workspace = Workspace::new();
    workspace
        .run(
            &service,
            Screen::Sampling,
            StatRequest::sample_size(0.95, 0.05, 0.5, None).unwrap(),
        )
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path()).with_name("sampling");
    let exporter = ReportExporter::new();

    let err = exporter
        .export(workspace.panel(Screen::Sampling), &config)
        .unwrap_err();
    assert!(matches!(err, ExportError::NotCaptured { screen: Screen::Sampling }));

    workspace.panel_mut(Screen::Sampling).capture().unwrap();
    let panel = workspace.panel(Screen::Sampling);
    assert!(panel.can_export());

    let result = exporter.export(panel, &config).unwrap();
    assert_eq!(result.files.len(), if cfg!(feature = "pdf") { 4 } else { 3 });

    let typ = std::fs::read_to_string(result.path(ExportFormat::Typst).unwrap()).unwrap();
    assert!(typ.contains("image(\"sampling.svg\""));
    assert!(typ.contains("385"));
    assert!(typ.contains("95% confidence"));

    let svg = std::fs::read_to_string(result.path(ExportFormat::Svg).unwrap()).unwrap();
    assert!(svg.starts_with("<svg"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(result.path(ExportFormat::Json).unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["response"]["operation"], "sample_size");
    assert_eq!(json["response"]["result"]["sample_size"], 385);
    assert_eq!(json["inputs"]["confidence_level"], 0.95);
}

#[tokio::test]
async fn test_upload_goes_to_owning_screen() {
    let service = FakeService::replying(vec![Err(ClientError::service(400, "Columns not found"))]);
    let mut workspace = Workspace::new();
    let file = UploadFile::from_bytes("data.csv", b"1,2\n".to_vec()).unwrap();

    let panel = workspace
        .upload(&service, UploadKind::Regression, &file)
        .await
        .unwrap();
    assert_eq!(panel.screen(), Screen::Regression);
    assert_eq!(panel.error(), Some("Columns not found"));
}

#[tokio::test]
async fn test_upload_after_manual_run_exports_only_the_file() {
    let service = FakeService::replying(vec![Ok(descriptive_reply()), Ok(descriptive_reply())]);
    let mut workspace = Workspace::new();

    workspace
        .run(
            &service,
            Screen::Descriptive,
            StatRequest::descriptive(vec![101.5, 202.5, 303.5]).unwrap(),
        )
        .await
        .unwrap();
    assert!(workspace.panel(Screen::Descriptive).request().is_some());

    let file = UploadFile::from_bytes("other.csv", b"value\n2\n4\n6\n8\n".to_vec()).unwrap();
    let panel = workspace
        .upload(&service, UploadKind::Descriptive, &file)
        .await
        .unwrap();
    assert!(panel.request().is_none());
    assert_eq!(panel.source(), Some("other.csv"));

    workspace.panel_mut(Screen::Descriptive).capture().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path()).with_name("descriptive").without_pdf();
    let result = ReportExporter::new()
        .export(workspace.panel(Screen::Descriptive), &config)
        .unwrap();

    let typ = std::fs::read_to_string(result.path(ExportFormat::Typst).unwrap()).unwrap();
    assert!(!typ.contains("sample\\_data"));
    assert!(!typ.contains("101.5"));
    assert!(typ.contains("[uploaded\\_file], [other.csv]"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(result.path(ExportFormat::Json).unwrap()).unwrap())
            .unwrap();
    assert_eq!(json["source_file"], "other.csv");
    assert!(!json.to_string().contains("101.5"));
}

#[tokio::test]
async fn test_pie_chart_capture_for_frequency_table() {
    let service = FakeService::replying(vec![Ok(descriptive_reply())]);
    let mut workspace = Workspace::new();
    workspace
        .run(
            &service,
            Screen::Descriptive,
            StatRequest::descriptive(vec![2.0, 4.0, 6.0, 8.0]).unwrap(),
        )
        .await
        .unwrap();

    let panel = workspace.panel_mut(Screen::Descriptive);
    panel.set_frequency_chart(FrequencyChart::Pie);
    panel.capture().unwrap();
    let svg = &panel.snapshot().unwrap().svg;
    assert!(svg.contains("3.50 (50.0%)"));
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_export_compiles_pdf() {
    let service = FakeService::replying(vec![Ok(binomial_reply())]);
    let mut workspace = Workspace::new();
    workspace
        .run(&service, Screen::Probability, StatRequest::binomial(10, 0.5, 5).unwrap())
        .await
        .unwrap();
    workspace.panel_mut(Screen::Probability).capture().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig::new(dir.path()).with_name("binomial");
    let result = ReportExporter::new()
        .export(workspace.panel(Screen::Probability), &config)
        .unwrap();

    let pdf = std::fs::read(result.path(ExportFormat::Pdf).unwrap()).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
}
