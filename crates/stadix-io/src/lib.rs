//! stadix-io - Input collection for the stadix statistics toolkit
//!
//! This crate turns what a student types or loads into values the
//! statistics service accepts:
//!
//! - **Text lists**: comma-separated numbers or mixed labels
//! - **Count matrices**: newline-separated rows for contingency tables
//! - **CSV columns**: the first one or two numeric columns of a local file
//! - **Uploads**: CSV/XLS/XLSX files forwarded to the service untouched
//!
//! # Design
//!
//! Parsing is lenient about formatting (whitespace, blank tokens) but strict
//! about shape: length mismatches and ragged matrices are rejected here so a
//! request is never sent with inputs the service cannot use.

pub mod error;
pub mod text;
pub mod upload;

#[cfg(feature = "csv")]
pub mod csv_reader;

pub use error::*;
pub use text::*;
pub use upload::*;

#[cfg(feature = "csv")]
pub use csv_reader::*;
