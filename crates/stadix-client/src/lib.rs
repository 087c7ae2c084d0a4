//! stadix-client - Typed client for the stadix statistics service
//!
//! Every reported statistic (descriptive summaries, regression, hypothesis
//! tests, chi-square, sample sizes, probabilities, variable classification)
//! is computed by the external service. This crate owns the boundary:
//!
//! - [`Operation`]: the catalogue of endpoints
//! - [`StatRequest`]: validated request payloads; invalid input never leaves
//!   the process
//! - [`StatResponse`]: tagged, validated response variants; a malformed
//!   service response fails with a named field instead of reaching the
//!   renderer
//! - [`StatsClient`]: one HTTP round trip per call, no retries
//! - [`ClientConfig`]: the single source of the service base URL
//!
//! # Example
//!
//! ```ignore
//! let client = StatsClient::new(ClientConfig::resolve(None, None)?)?;
//! let request = StatRequest::descriptive(vec![10.0, 12.0, 23.0])?;
//! let response = client.send(&request).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod operation;
pub mod request;
pub mod response;

pub use client::*;
pub use config::*;
pub use error::*;
pub use operation::*;
pub use request::*;
pub use response::*;
