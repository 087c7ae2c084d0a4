//! Log-domain special functions

use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_93,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_13,
    -176.615_029_162_140_59,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_571_6e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation, g = 7).
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut sum = LANCZOS_COEFFICIENTS[0];
        for (i, c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
            sum += c / (x + i as f64);
        }
        let t = x + LANCZOS_G + 0.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
    }
}

/// ln(n!)
///
/// Small arguments are summed directly so results stay exact where the
/// chart labels can show them.
pub fn ln_factorial(n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    if n <= 20 {
        return (2..=n).map(|i| (i as f64).ln()).sum();
    }
    ln_gamma(n as f64 + 1.0)
}

/// ln C(n, k); negative infinity when k > n
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

/// Gaussian probability density
pub fn normal_pdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * PI).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ln_gamma_integers() {
        // Γ(5) = 24
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-12);
        // Γ(1) = Γ(2) = 1
        assert!(ln_gamma(1.0).abs() < 1e-12);
        assert!(ln_gamma(2.0).abs() < 1e-12);
    }

    #[test]
    fn test_ln_gamma_half() {
        // Γ(1/2) = √π
        assert!((ln_gamma(0.5) - PI.sqrt().ln()).abs() < 1e-12);
    }

    #[test]
    fn test_ln_factorial_matches_gamma() {
        for n in [0u64, 1, 5, 20, 21, 50, 170] {
            let direct = ln_gamma(n as f64 + 1.0);
            assert!(
                (ln_factorial(n) - direct).abs() < 1e-8 * direct.abs().max(1.0),
                "n = {n}"
            );
        }
    }

    #[test]
    fn test_ln_choose() {
        assert!((ln_choose(10, 5).exp() - 252.0).abs() < 1e-9);
        assert!((ln_choose(10, 0).exp() - 1.0).abs() < 1e-12);
        assert_eq!(ln_choose(3, 4), f64::NEG_INFINITY);
    }

    #[test]
    fn test_ln_choose_large_does_not_overflow() {
        let value = ln_choose(10_000, 5_000);
        assert!(value.is_finite());
        assert!(value > 6_000.0);
    }

    #[test]
    fn test_normal_pdf_peak() {
        let peak = normal_pdf(0.0, 0.0, 1.0);
        assert!((peak - 0.398_942_280_401_432_7).abs() < 1e-12);
    }
}
