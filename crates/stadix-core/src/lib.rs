//! stadix-core - Screens, result rendering and report export
//!
//! This crate sits between input collection and the statistics service on
//! one side and whatever presents results (the CLI) on the other:
//!
//! - [`Panel`] / [`Workspace`]: per-screen view-models with request tokens
//! - [`render_tables`] / [`interpretation`]: display tables and automatic
//!   interpretation sentences
//! - [`chart_series`] / [`ChartSnapshot`]: chart data and its SVG capture
//! - [`ReportExporter`]: Typst + SVG + JSON report bundles, plus a compiled
//!   PDF with the `pdf` feature
//!
//! # Design
//!
//! Panels are scoped to their screen; nothing is shared between screens and
//! nothing outlives the session. A response is applied only if its token is
//! still the panel's latest, so resubmitting or switching mode never shows a
//! stale result.

pub mod chart;
pub mod error;
pub mod export;
pub mod panel;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod render;
pub mod snapshot;
pub mod workspace;

pub use chart::*;
pub use error::*;
pub use export::*;
pub use panel::*;
#[cfg(feature = "pdf")]
pub use pdf::*;
pub use render::*;
pub use snapshot::*;
pub use workspace::*;
