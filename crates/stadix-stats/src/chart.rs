//! Plot point synthesis for probability distributions
//!
//! Every function here is pure: the same parameters always produce the same
//! point sequence.

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};
use crate::special::{ln_choose, ln_factorial, normal_pdf};

/// Intervals between the first and last point of a normal curve
pub const NORMAL_CURVE_INTERVALS: usize = 100;

/// Half-width of the normal curve in standard deviations
pub const NORMAL_CURVE_SPAN: f64 = 4.0;

/// Largest number of binomial trials that will be charted
pub const MAX_BINOMIAL_TRIALS: u64 = 100_000;

/// Largest Poisson rate that will be charted
pub const MAX_POISSON_RATE: f64 = 100_000.0;

/// Minimum last k shown for a Poisson chart
pub const MIN_POISSON_LIMIT: u64 = 15;

/// One sample of a continuous density
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub density: f64,
    /// Whether the point lies at or below the evaluated value
    pub shaded: bool,
}

/// Probability of one outcome of a discrete distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassPoint {
    pub k: u64,
    pub probability: f64,
    /// Whether this is the outcome being evaluated
    pub target: bool,
}

/// Normal density curve across μ ± 4σ.
///
/// Produces `NORMAL_CURVE_INTERVALS + 1` equally spaced points including
/// both ends, flagging those at or below `threshold` as shaded.
pub fn normal_curve(mean: f64, std_dev: f64, threshold: f64) -> SynthResult<Vec<CurvePoint>> {
    if !mean.is_finite() {
        return Err(SynthError::invalid("mean", "must be finite"));
    }
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return Err(SynthError::invalid(
            "std_dev",
            format!("must be positive and finite, got {std_dev}"),
        ));
    }
    if threshold.is_nan() {
        return Err(SynthError::invalid("x", "must be a number"));
    }

    let start = mean - NORMAL_CURVE_SPAN * std_dev;
    let step = 2.0 * NORMAL_CURVE_SPAN * std_dev / NORMAL_CURVE_INTERVALS as f64;

    Ok((0..=NORMAL_CURVE_INTERVALS)
        .map(|i| {
            let x = start + step * i as f64;
            CurvePoint {
                x,
                density: normal_pdf(x, mean, std_dev),
                shaded: x <= threshold,
            }
        })
        .collect())
}

/// Binomial probability mass for k = 0..=n.
pub fn binomial_masses(n: u64, p: f64, target_k: u64) -> SynthResult<Vec<MassPoint>> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SynthError::invalid(
            "p",
            format!("must be between 0 and 1, got {p}"),
        ));
    }
    if n > MAX_BINOMIAL_TRIALS {
        return Err(SynthError::invalid(
            "n",
            format!("at most {MAX_BINOMIAL_TRIALS} trials can be charted, got {n}"),
        ));
    }

    Ok((0..=n)
        .map(|k| MassPoint {
            k,
            probability: binomial_pmf(n, p, k),
            target: k == target_k,
        })
        .collect())
}

fn binomial_pmf(n: u64, p: f64, k: u64) -> f64 {
    // Degenerate trials put all mass on one outcome; ln(0) would give NaN.
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }
    let ln_p = ln_choose(n, k) + k as f64 * p.ln() + (n - k) as f64 * (1.0 - p).ln();
    ln_p.exp()
}

/// Last k shown on a Poisson chart: max(15, ⌈3λ⌉)
pub fn poisson_limit(lambda: f64) -> u64 {
    ((lambda * 3.0).ceil() as u64).max(MIN_POISSON_LIMIT)
}

/// Poisson probability mass for k = 0..=max(15, ⌈3λ⌉).
pub fn poisson_masses(lambda: f64, target_k: u64) -> SynthResult<Vec<MassPoint>> {
    if !lambda.is_finite() || lambda <= 0.0 {
        return Err(SynthError::invalid(
            "lambda",
            format!("must be positive and finite, got {lambda}"),
        ));
    }
    if lambda > MAX_POISSON_RATE {
        return Err(SynthError::invalid(
            "lambda",
            format!("at most {MAX_POISSON_RATE} can be charted, got {lambda}"),
        ));
    }

    let ln_lambda = lambda.ln();
    Ok((0..=poisson_limit(lambda))
        .map(|k| MassPoint {
            k,
            probability: (k as f64 * ln_lambda - lambda - ln_factorial(k)).exp(),
            target: k == target_k,
        })
        .collect())
}

/// Distribution parameters as entered on the probability screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    Normal { mean: f64, std_dev: f64, x: f64 },
    Binomial { n: u64, p: f64, k: u64 },
    Poisson { lambda: f64, k: u64 },
}

impl Distribution {
    /// Synthesize the plot points for these parameters
    pub fn synthesize(&self) -> SynthResult<ChartSeries> {
        match *self {
            Distribution::Normal { mean, std_dev, x } => {
                normal_curve(mean, std_dev, x).map(ChartSeries::Curve)
            }
            Distribution::Binomial { n, p, k } => {
                binomial_masses(n, p, k).map(ChartSeries::Mass)
            }
            Distribution::Poisson { lambda, k } => {
                poisson_masses(lambda, k).map(ChartSeries::Mass)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Normal { .. } => "Normal",
            Distribution::Binomial { .. } => "Binomial",
            Distribution::Poisson { .. } => "Poisson",
        }
    }
}

/// Synthesized plot data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum ChartSeries {
    Curve(Vec<CurvePoint>),
    Mass(Vec<MassPoint>),
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Curve(points) => points.len(),
            ChartSeries::Mass(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trapezoidal area under a density curve; total mass for discrete series
    pub fn trapezoid_area(&self) -> f64 {
        match self {
            ChartSeries::Curve(points) => points
                .windows(2)
                .map(|w| 0.5 * (w[1].x - w[0].x) * (w[0].density + w[1].density))
                .sum(),
            ChartSeries::Mass(_) => self.total_mass(),
        }
    }

    /// Sum of probabilities; zero for curves
    pub fn total_mass(&self) -> f64 {
        match self {
            ChartSeries::Curve(_) => 0.0,
            ChartSeries::Mass(points) => points.iter().map(|p| p.probability).sum(),
        }
    }

    /// Largest y value, used to scale axes
    pub fn max_value(&self) -> f64 {
        match self {
            ChartSeries::Curve(points) => points.iter().map(|p| p.density).fold(0.0, f64::max),
            ChartSeries::Mass(points) => {
                points.iter().map(|p| p.probability).fold(0.0, f64::max)
            }
        }
    }

    /// Outcome with the highest probability
    pub fn mode(&self) -> Option<u64> {
        match self {
            ChartSeries::Curve(_) => None,
            ChartSeries::Mass(points) => points
                .iter()
                .max_by(|a, b| a.probability.total_cmp(&b.probability))
                .map(|p| p.k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_curve_shape() {
        let points = normal_curve(0.0, 1.0, 0.0).unwrap();
        assert_eq!(points.len(), NORMAL_CURVE_INTERVALS + 1);
        assert!((points[0].x + 4.0).abs() < 1e-12);
        assert!((points[100].x - 4.0).abs() < 1e-12);
        assert!((points[50].x).abs() < 1e-12);
        assert!(points[50].shaded);
        assert!(!points[51].shaded);
    }

    #[test]
    fn test_normal_curve_rejects_zero_sigma() {
        let err = normal_curve(0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, SynthError::InvalidParameter { ref name, .. } if name == "std_dev"));
        assert!(normal_curve(0.0, -1.0, 0.0).is_err());
        assert!(normal_curve(f64::NAN, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_binomial_known_values() {
        let points = binomial_masses(10, 0.5, 5).unwrap();
        assert_eq!(points.len(), 11);
        assert!((points[5].probability - 252.0 / 1024.0).abs() < 1e-12);
        assert!(points[5].target);
        assert!(!points[4].target);
    }

    #[test]
    fn test_binomial_degenerate_p() {
        let zero = binomial_masses(4, 0.0, 0).unwrap();
        assert_eq!(zero[0].probability, 1.0);
        assert_eq!(zero[3].probability, 0.0);

        let one = binomial_masses(4, 1.0, 4).unwrap();
        assert_eq!(one[4].probability, 1.0);
        assert_eq!(one[0].probability, 0.0);
    }

    #[test]
    fn test_binomial_large_n_sums_to_one() {
        let series = ChartSeries::Mass(binomial_masses(2_000, 0.3, 600).unwrap());
        assert!((series.total_mass() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_binomial_rejects_bad_parameters() {
        assert!(binomial_masses(10, 1.5, 0).is_err());
        assert!(binomial_masses(10, f64::NAN, 0).is_err());
        assert!(binomial_masses(MAX_BINOMIAL_TRIALS + 1, 0.5, 0).is_err());
    }

    #[test]
    fn test_poisson_limit() {
        assert_eq!(poisson_limit(3.0), 15);
        assert_eq!(poisson_limit(10.0), 30);
        assert_eq!(poisson_limit(6.1), 19);
    }

    #[test]
    fn test_poisson_known_values() {
        let points = poisson_masses(3.0, 2).unwrap();
        assert_eq!(points.len(), 16);
        // P(X=2) = 9 e^-3 / 2
        let expected = 4.5 * (-3.0f64).exp();
        assert!((points[2].probability - expected).abs() < 1e-12);
        assert!(points[2].target);
    }

    #[test]
    fn test_poisson_rejects_bad_rate() {
        assert!(poisson_masses(0.0, 1).is_err());
        assert!(poisson_masses(-2.0, 1).is_err());
        assert!(poisson_masses(f64::INFINITY, 1).is_err());
    }

    #[test]
    fn test_distribution_dispatch() {
        let series = Distribution::Binomial { n: 10, p: 0.5, k: 5 }
            .synthesize()
            .unwrap();
        assert_eq!(series.len(), 11);
        assert_eq!(series.mode(), Some(5));

        let curve = Distribution::Normal {
            mean: 10.0,
            std_dev: 2.0,
            x: 12.0,
        }
        .synthesize()
        .unwrap();
        assert!(matches!(curve, ChartSeries::Curve(_)));
        assert_eq!(curve.mode(), None);
    }
}
