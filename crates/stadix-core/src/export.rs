//! Report export
//!
//! A report is a small bundle written next to each other:
//! - `<name>.typ`: Typst document with tables, chart and interpretation
//! - `<name>.svg`: the captured chart referenced by the document
//! - `<name>.pdf`: the same document compiled in-process (`pdf` feature)
//! - `<name>.json`: the validated result and inputs (optional)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use stadix_client::{StatRequest, StatResponse};
use tracing::info;

use crate::error::{ExportError, ExportOutcome};
use crate::panel::{Panel, Screen};
use crate::render::{interpretation_with, render_tables, Table};
use crate::snapshot::ChartSnapshot;

/// Longest list of input values printed in a report
const MAX_LISTED_VALUES: usize = 20;

/// File kinds in a report bundle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Typst report source
    Typst,
    /// SVG chart snapshot
    Svg,
    /// Machine-readable result
    Json,
    /// Compiled report
    Pdf,
}

impl ExportFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Typst => "typ",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Get MIME type for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Typst => "text/plain",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// Export configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the bundle is written to
    pub output_dir: PathBuf,

    /// File stem shared by the bundle (None = derived from screen and time)
    pub base_name: Option<String>,

    /// Custom title (overrides the result title)
    pub title: Option<String>,

    /// Whether to write the JSON result next to the report
    pub include_json: bool,

    /// Whether to compile the PDF (needs the `pdf` feature)
    pub include_pdf: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            base_name: None,
            title: None,
            include_json: true,
            include_pdf: true,
        }
    }
}

impl ExportConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Set file stem
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = Some(name.into());
        self
    }

    /// Set title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Skip the JSON file
    pub fn without_json(mut self) -> Self {
        self.include_json = false;
        self
    }

    /// Skip the PDF
    pub fn without_pdf(mut self) -> Self {
        self.include_pdf = false;
        self
    }

    /// File stem for a screen
    pub fn stem(&self, screen: Screen) -> String {
        self.base_name.clone().unwrap_or_else(|| {
            format!(
                "stadix-{}-{}",
                screen.slug(),
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            )
        })
    }

    /// Get suggested filename based on format
    pub fn suggested_filename(&self, base: &str, format: ExportFormat) -> String {
        format!("{}.{}", base, format.extension())
    }
}

/// Metadata about the export
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Unique report identifier
    pub report_id: String,

    /// Creation timestamp (ISO 8601)
    pub created_at: String,

    pub screen: Screen,

    /// Software version
    pub software_version: String,
}

impl ExportMetadata {
    pub fn new(screen: Screen) -> Self {
        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            screen,
            software_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Files written by one export
#[derive(Clone, Debug)]
pub struct ExportResult {
    pub files: Vec<(ExportFormat, PathBuf)>,
    pub metadata: ExportMetadata,
}

impl ExportResult {
    pub fn path(&self, format: ExportFormat) -> Option<&Path> {
        self.files
            .iter()
            .find(|(f, _)| *f == format)
            .map(|(_, path)| path.as_path())
    }
}

/// Where the report document finds its chart
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportImage<'a> {
    /// SVG file next to the document
    File(&'a str),
    /// The snapshot embedded in the document itself
    Inline,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ExportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<&'a StatRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_file: Option<&'a str>,
    response: &'a StatResponse,
}

/// Writes report bundles for captured panels
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportExporter;

impl ReportExporter {
    pub fn new() -> Self {
        Self
    }

    /// Export the panel's result.
    ///
    /// Fails with [`ExportError::NoResult`] when nothing is shown and with
    /// [`ExportError::NotCaptured`] when the chart has not been captured.
    pub fn export(&self, panel: &Panel, config: &ExportConfig) -> ExportOutcome<ExportResult> {
        let screen = panel.screen();
        let response = panel.response().ok_or(ExportError::NoResult { screen })?;
        let snapshot = panel.snapshot().ok_or(ExportError::NotCaptured { screen })?;

        let metadata = ExportMetadata::new(screen);
        let stem = config.stem(screen);
        let dir = &config.output_dir;
        std::fs::create_dir_all(dir).map_err(|e| write_failed(dir, e))?;

        let mut files = Vec::new();

        let svg_name = config.suggested_filename(&stem, ExportFormat::Svg);
        let svg_path = dir.join(&svg_name);
        write(&svg_path, &snapshot.svg)?;
        files.push((ExportFormat::Svg, svg_path));

        let title = config
            .title
            .clone()
            .unwrap_or_else(|| response.title().to_string());
        let document = generate_typst_report(
            &title,
            response,
            panel.request(),
            panel.source(),
            snapshot,
            ReportImage::File(&svg_name),
            &metadata,
        );
        let typ_path = dir.join(config.suggested_filename(&stem, ExportFormat::Typst));
        write(&typ_path, &document)?;
        files.push((ExportFormat::Typst, typ_path));

        #[cfg(feature = "pdf")]
        if config.include_pdf {
            let standalone = generate_typst_report(
                &title,
                response,
                panel.request(),
                panel.source(),
                snapshot,
                ReportImage::Inline,
                &metadata,
            );
            let bytes = crate::pdf::compile_pdf(&standalone)?;
            let pdf_path = dir.join(config.suggested_filename(&stem, ExportFormat::Pdf));
            std::fs::write(&pdf_path, bytes).map_err(|e| write_failed(&pdf_path, e))?;
            files.push((ExportFormat::Pdf, pdf_path));
        }

        if config.include_json {
            let report = JsonReport {
                metadata: &metadata,
                inputs: panel.request(),
                source_file: panel.source(),
                response,
            };
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| ExportError::Serialize(e.to_string()))?;
            let json_path = dir.join(config.suggested_filename(&stem, ExportFormat::Json));
            write(&json_path, &json)?;
            files.push((ExportFormat::Json, json_path));
        }

        info!(%screen, report_id = %metadata.report_id, files = files.len(), "report exported");
        Ok(ExportResult { files, metadata })
    }
}

fn write_failed(path: &Path, err: std::io::Error) -> ExportError {
    ExportError::WriteFailed {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn write(path: &Path, contents: &str) -> ExportOutcome<()> {
    std::fs::write(path, contents).map_err(|e| write_failed(path, e))
}

/// Escape text for Typst markup
fn typst_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '[' | ']' | '#' | '*' | '_' | '$' | '@' | '<' | '>' | '`' | '~' | '='
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text for a Typst string literal
fn typst_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn typst_table(table: &Table) -> String {
    let mut cells: Vec<String> = table
        .headers
        .iter()
        .map(|h| format!("[*{}*]", typst_escape(h)))
        .collect();
    for row in &table.rows {
        cells.extend(row.iter().map(|c| format!("[{}]", typst_escape(c))));
    }
    format!(
        "=== {}\n#table(\n  columns: {},\n  {},\n)\n",
        typst_escape(&table.title),
        table.headers.len().max(1),
        cells.join(", ")
    )
}

/// Request inputs as label/value pairs
fn input_rows(request: &StatRequest) -> Vec<(String, String)> {
    let Ok(Value::Object(fields)) = serde_json::to_value(request) else {
        return Vec::new();
    };
    fields
        .into_iter()
        .map(|(key, value)| (key, describe_value(&value)))
        .collect()
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "none".to_string(),
        Value::Array(items) => {
            let shown: Vec<String> = items
                .iter()
                .take(MAX_LISTED_VALUES)
                .map(describe_value)
                .collect();
            if items.len() > MAX_LISTED_VALUES {
                format!("[{}, … ({} values)]", shown.join(", "), items.len())
            } else {
                format!("[{}]", shown.join(", "))
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Generate the Typst report source
pub fn generate_typst_report(
    title: &str,
    response: &StatResponse,
    request: Option<&StatRequest>,
    source: Option<&str>,
    snapshot: &ChartSnapshot,
    image: ReportImage<'_>,
    metadata: &ExportMetadata,
) -> String {
    let mut doc = String::new();
    doc.push_str(&format!(
        "#set document(title: \"{}\")\n#set page(paper: \"a4\", margin: 2cm)\n#set text(size: 10pt)\n\n",
        typst_string(title)
    ));
    doc.push_str(&format!("= {}\n\n", typst_escape(title)));
    doc.push_str(&format!(
        "_Generated on {} (report {})_\n\n",
        typst_escape(&metadata.created_at),
        typst_escape(&metadata.report_id)
    ));

    let mut section = 1;
    let mut rows = request.map(input_rows).unwrap_or_default();
    if let Some(file_name) = source {
        rows.push(("uploaded_file".to_string(), file_name.to_string()));
    }
    if !rows.is_empty() {
        doc.push_str(&format!("== {section}. Inputs\n\n"));
        let inputs = Table {
            title: "Submitted values".to_string(),
            headers: vec!["Field".to_string(), "Value".to_string()],
            rows: rows.into_iter().map(|(k, v)| vec![k, v]).collect(),
        };
        doc.push_str(&typst_table(&inputs));
        doc.push('\n');
        section += 1;
    }

    doc.push_str(&format!("== {section}. Results\n\n"));
    for table in render_tables(response) {
        doc.push_str(&typst_table(&table));
        doc.push('\n');
    }
    section += 1;

    doc.push_str(&format!("== {section}. Visual summary\n\n"));
    let image = match image {
        ReportImage::File(path) => format!("image(\"{}\", width: 100%)", typst_string(path)),
        ReportImage::Inline => format!(
            "image(bytes(\"{}\"), format: \"svg\", width: 100%)",
            typst_string(&snapshot.svg)
        ),
    };
    doc.push_str(&format!(
        "#figure(\n  {image},\n  caption: [{}],\n)\n\n",
        typst_escape(&snapshot.title)
    ));
    section += 1;

    if let Some(text) = interpretation_with(response, request) {
        doc.push_str(&format!("== {section}. Interpretation\n\n{}\n\n", typst_escape(&text)));
    }

    doc.push_str(&format!(
        "#align(center, text(size: 8pt, fill: gray)[Generated by stadix {}])\n",
        typst_escape(&metadata.software_version)
    ));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typst_escape() {
        assert_eq!(typst_escape("p < 0.05 #1"), "p \\< 0.05 \\#1");
        assert_eq!(typst_escape("a_b*c"), "a\\_b\\*c");
        assert_eq!(typst_string("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn test_typst_table_shape() {
        let table = Table {
            title: "T".to_string(),
            headers: vec!["A".to_string(), "B".to_string()],
            rows: vec![vec!["1".to_string(), "2".to_string()]],
        };
        let out = typst_table(&table);
        assert!(out.contains("columns: 2"));
        assert!(out.contains("[*A*], [*B*], [1], [2]"));
    }

    #[test]
    fn test_input_rows_truncate_long_lists() {
        let request = StatRequest::descriptive((0..30).map(f64::from).collect()).unwrap();
        let rows = input_rows(&request);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "sample_data");
        assert!(rows[0].1.contains("30 values"));
    }

    fn normal() -> StatResponse {
        StatResponse::Normal(stadix_client::NormalProbability {
            prob_left: 0.8413,
            prob_right: 0.1587,
            z_score: 1.0,
        })
    }

    #[test]
    fn test_inline_image_embeds_snapshot() {
        let snapshot = ChartSnapshot::card("Normal", &[("z".to_string(), "1".to_string())], 200, 100);
        let metadata = ExportMetadata::new(Screen::Probability);

        let doc = generate_typst_report(
            "Normal",
            &normal(),
            None,
            None,
            &snapshot,
            ReportImage::Inline,
            &metadata,
        );
        assert!(doc.contains("image(bytes(\"<svg xmlns=\\\"http://www.w3.org/2000/svg\\\""));
        assert!(doc.contains("format: \"svg\""));
        assert!(!doc.contains("Inputs"));

        let doc = generate_typst_report(
            "Normal",
            &normal(),
            None,
            None,
            &snapshot,
            ReportImage::File("normal.svg"),
            &metadata,
        );
        assert!(doc.contains("image(\"normal.svg\", width: 100%)"));
    }

    #[test]
    fn test_uploaded_file_listed_as_input() {
        let snapshot = ChartSnapshot::card("Normal", &[], 200, 100);
        let doc = generate_typst_report(
            "Descriptive",
            &normal(),
            None,
            Some("grades.xlsx"),
            &snapshot,
            ReportImage::Inline,
            &ExportMetadata::new(Screen::Descriptive),
        );
        assert!(doc.contains("== 1. Inputs"));
        assert!(doc.contains("[uploaded\\_file], [grades.xlsx]"));
    }

    #[test]
    fn test_typst_string_escapes_newlines() {
        assert_eq!(typst_string("a\nb"), "a\\nb");
    }

    #[test]
    fn test_export_format_extensions() {
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(ExportFormat::Typst.extension(), "typ");
        assert_eq!(ExportFormat::Svg.mime_type(), "image/svg+xml");
        let config = ExportConfig::new("/tmp").with_name("report");
        assert_eq!(config.stem(Screen::Sampling), "report");
        assert_eq!(config.suggested_filename("report", ExportFormat::Json), "report.json");
    }
}
