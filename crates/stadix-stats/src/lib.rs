//! stadix-stats - Chart point synthesis for probability visualizations
//!
//! The statistics service computes every reported number. This crate only
//! produces the dense point sequences used to draw distributions once the
//! service has accepted the parameters:
//!
//! - **Normal**: density curve over μ ± 4σ with a shaded region
//! - **Binomial**: probability mass for k = 0..=n
//! - **Poisson**: probability mass for k = 0..=max(15, ⌈3λ⌉)
//!
//! # Numerics
//!
//! Factorials and binomial coefficients are evaluated in log space through
//! a Lanczos log-gamma, so large `n` or `k` never overflow; only the final
//! probability is exponentiated.

pub mod chart;
pub mod error;
pub mod regression;
pub mod special;

pub use chart::*;
pub use error::*;
pub use regression::*;
pub use special::*;
