//! Closed-form least squares, used to check regression results
//!
//! The service owns the regression computation; this reference fit exists so
//! a returned slope and intercept can be compared with the textbook formulas.

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};

/// Least-squares fit of y = slope·x + intercept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeastSquares {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LeastSquares {
    /// Fit paired observations
    pub fn fit(x: &[f64], y: &[f64]) -> SynthResult<Self> {
        if x.len() != y.len() {
            return Err(SynthError::InsufficientData(format!(
                "x has {} values, y has {}",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(SynthError::InsufficientData(
                "at least two points are needed".to_string(),
            ));
        }

        let n = x.len() as f64;
        let mean_x = x.iter().sum::<f64>() / n;
        let mean_y = y.iter().sum::<f64>() / n;

        let mut sxx = 0.0;
        let mut syy = 0.0;
        let mut sxy = 0.0;
        for (&xi, &yi) in x.iter().zip(y) {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            sxx += dx * dx;
            syy += dy * dy;
            sxy += dx * dy;
        }

        if sxx == 0.0 {
            return Err(SynthError::invalid("x", "all x values are equal"));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Predicted y for a given x
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textbook_example() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = LeastSquares::fit(&x, &y).unwrap();

        assert!((fit.slope - 0.6).abs() < 1e-12);
        assert!((fit.intercept - 2.2).abs() < 1e-12);
        assert!((fit.r_squared - 0.6).abs() < 1e-12);
        assert!((fit.predict(6.0) - 5.8).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_mismatch_and_constant_x() {
        assert!(LeastSquares::fit(&[1.0, 2.0], &[1.0]).is_err());
        assert!(LeastSquares::fit(&[1.0], &[1.0]).is_err());
        assert!(LeastSquares::fit(&[2.0, 2.0], &[1.0, 3.0]).is_err());
    }
}
