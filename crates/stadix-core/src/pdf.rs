//! In-process PDF compilation of report documents

use tracing::warn;
use typst_as_lib::{typst_kit_options::TypstKitFontOptions, TypstEngine};

use crate::error::{ExportError, ExportOutcome};

/// Compile a self-contained Typst document to PDF bytes.
///
/// The document must not reference other files; the report embeds its
/// chart inline for this.
pub fn compile_pdf(source: &str) -> ExportOutcome<Vec<u8>> {
    let engine = TypstEngine::builder()
        .main_file(source)
        .search_fonts_with(
            TypstKitFontOptions::default()
                .include_system_fonts(true)
                .include_embedded_fonts(true),
        )
        .build();

    let compiled = engine.compile();
    for warning in &compiled.warnings {
        warn!(?warning, "typst warning");
    }

    let document = compiled
        .output
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))?;

    typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
        .map_err(|e| ExportError::Pdf(format!("{e:?}")))
}
