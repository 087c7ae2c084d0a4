//! Terminal rendering of results

use std::fmt::Write as _;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table as TermTable};
use stadix_client::{StatRequest, StatResponse};
use stadix_core::{interpretation_with, render_tables, ExportResult, Table};

use crate::error::CliResult;

/// Convert a rendered table for the terminal
pub fn term_table(table: &Table) -> TermTable {
    let mut out = TermTable::new();
    out.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.headers.clone());
    for row in &table.rows {
        out.add_row(row.clone());
    }
    out
}

/// Tables followed by the interpretation paragraph
pub fn render_text(response: &StatResponse, request: Option<&StatRequest>) -> String {
    let mut out = String::new();
    for table in render_tables(response) {
        let _ = writeln!(out, "{}\n{}\n", table.title, term_table(&table));
    }

    if let Some(text) = interpretation_with(response, request) {
        let _ = writeln!(out, "Interpretation: {text}");
    }
    out
}

pub fn render_json(response: &StatResponse) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

/// One line per written report file
pub fn render_export(result: &ExportResult) -> String {
    let mut out = format!("Report {} written:\n", result.metadata.report_id);
    for (format, path) in &result.files {
        let _ = writeln!(out, "  {:<6} {}", format!("{format:?}"), path.display());
    }
    out
}
