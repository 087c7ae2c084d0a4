//! Validated request payloads
//!
//! Each payload is built through a constructor that runs the local checks.
//! [`StatRequest::validate`] repeats them right before dispatch, so a request
//! assembled field by field still cannot reach the network with bad input.

use serde::Serialize;
use stadix_io::{paired, require_len, CountMatrix, InputError, InputResult, MixedValue};

use crate::operation::Operation;

fn out_of_range(name: &str, reason: impl Into<String>) -> InputError {
    InputError::OutOfRange {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn all_finite(values: &[f64], label: &str) -> InputResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(out_of_range(label, format!("value {} is not a finite number", i + 1))),
        None => Ok(()),
    }
}

fn finite(value: f64, name: &str) -> InputResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(name, "must be a finite number"))
    }
}

fn probability(value: f64, name: &str) -> InputResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(name, format!("must be between 0 and 1, got {value}")))
    }
}

fn open_unit(value: f64, name: &str) -> InputResult<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(out_of_range(
            name,
            format!("must be strictly between 0% and 100%, got {}%", value * 100.0),
        ))
    }
}

fn sample(values: &[f64], min: usize, label: &str) -> InputResult<()> {
    require_len(values, min, label)?;
    all_finite(values, label)
}

/// Summary statistics and frequency table for one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveRequest {
    pub sample_data: Vec<f64>,
}

impl DescriptiveRequest {
    pub fn new(sample_data: Vec<f64>) -> InputResult<Self> {
        let request = Self { sample_data };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        sample(&self.sample_data, 1, "sample")
    }
}

/// Simple linear regression of Y on X
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionRequest {
    pub x_data: Vec<f64>,
    pub y_data: Vec<f64>,
}

impl RegressionRequest {
    pub fn new(x_data: Vec<f64>, y_data: Vec<f64>) -> InputResult<Self> {
        let request = Self { x_data, y_data };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        paired(&self.x_data, &self.y_data)?;
        sample(&self.x_data, 2, "X")?;
        sample(&self.y_data, 2, "Y")
    }
}

/// One-sample t-test against a theoretical mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OneSampleTTestRequest {
    pub data: Vec<f64>,
    pub mu: f64,
}

impl OneSampleTTestRequest {
    pub fn new(data: Vec<f64>, mu: f64) -> InputResult<Self> {
        let request = Self { data, mu };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        sample(&self.data, 2, "sample")?;
        finite(self.mu, "theoretical mean")
    }
}

/// Independent two-sample t-test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoSampleTTestRequest {
    pub group1: Vec<f64>,
    pub group2: Vec<f64>,
}

impl TwoSampleTTestRequest {
    pub fn new(group1: Vec<f64>, group2: Vec<f64>) -> InputResult<Self> {
        let request = Self { group1, group2 };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        sample(&self.group1, 2, "group 1")?;
        sample(&self.group2, 2, "group 2")
    }
}

/// One-way ANOVA across three or more groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaRequest {
    pub groups: Vec<Vec<f64>>,
}

impl AnovaRequest {
    pub const MIN_GROUPS: usize = 3;

    pub fn new(groups: Vec<Vec<f64>>) -> InputResult<Self> {
        let request = Self { groups };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        if self.groups.len() < Self::MIN_GROUPS {
            return Err(InputError::TooFewValues {
                label: "ANOVA".to_string(),
                min: Self::MIN_GROUPS,
                found: self.groups.len(),
            });
        }
        for (i, group) in self.groups.iter().enumerate() {
            sample(group, 2, &format!("group {}", i + 1))?;
        }
        Ok(())
    }
}

/// Chi-square test of independence on observed counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquareRequest {
    pub observed_data: CountMatrix,
}

impl ChiSquareRequest {
    pub fn new(observed_data: CountMatrix) -> InputResult<Self> {
        let request = Self { observed_data };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        if self.observed_data.num_cols() < 2 {
            return Err(out_of_range(
                "observed table",
                format!("needs at least 2 columns, got {}", self.observed_data.num_cols()),
            ));
        }
        if self.observed_data.total() == 0 {
            return Err(out_of_range("observed table", "all counts are zero"));
        }
        Ok(())
    }
}

/// Sample size for estimating a proportion.
///
/// Confidence level and margin of error are fractions; the service expects
/// `0.95`, not `95`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSizeRequest {
    pub confidence_level: f64,
    pub margin_error: f64,
    pub p: f64,
    /// Finite population size; `null` means infinite
    pub population: Option<f64>,
}

impl SampleSizeRequest {
    /// Expected proportion used when nothing is known about it
    pub const DEFAULT_P: f64 = 0.5;

    pub fn new(
        confidence_level: f64,
        margin_error: f64,
        p: f64,
        population: Option<f64>,
    ) -> InputResult<Self> {
        let request = Self {
            confidence_level,
            margin_error,
            p,
            population,
        };
        request.validate()?;
        Ok(request)
    }

    /// Build from percentages as typed by a student (95, 5)
    pub fn from_percentages(
        confidence_percent: f64,
        margin_percent: f64,
        p: f64,
        population: Option<f64>,
    ) -> InputResult<Self> {
        Self::new(confidence_percent / 100.0, margin_percent / 100.0, p, population)
    }

    pub fn validate(&self) -> InputResult<()> {
        open_unit(self.confidence_level, "confidence level")?;
        open_unit(self.margin_error, "margin of error")?;
        probability(self.p, "p")?;
        if let Some(population) = self.population {
            if !population.is_finite() || population <= 0.0 {
                return Err(out_of_range("population", "must be a positive number"));
            }
        }
        Ok(())
    }
}

/// Binomial probability of exactly k successes in n trials
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinomialRequest {
    pub n: u64,
    pub p: f64,
    pub k: u64,
}

impl BinomialRequest {
    pub fn new(n: u64, p: f64, k: u64) -> InputResult<Self> {
        let request = Self { n, p, k };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        probability(self.p, "p")?;
        if self.k > self.n {
            return Err(out_of_range(
                "k",
                format!("must be between 0 and n = {}, got {}", self.n, self.k),
            ));
        }
        Ok(())
    }
}

/// Poisson probability of exactly k events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoissonRequest {
    #[serde(rename = "lam")]
    pub lambda: f64,
    pub k: u64,
}

impl PoissonRequest {
    pub fn new(lambda: f64, k: u64) -> InputResult<Self> {
        let request = Self { lambda, k };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        if !self.lambda.is_finite() || self.lambda <= 0.0 {
            return Err(out_of_range(
                "lambda",
                format!("must be positive, got {}", self.lambda),
            ));
        }
        Ok(())
    }
}

/// Normal probability at or below x
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalRequest {
    pub mean: f64,
    #[serde(rename = "std")]
    pub std_dev: f64,
    pub x: f64,
}

impl NormalRequest {
    pub fn new(mean: f64, std_dev: f64, x: f64) -> InputResult<Self> {
        let request = Self { mean, std_dev, x };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        finite(self.mean, "mean")?;
        finite(self.x, "x")?;
        if !self.std_dev.is_finite() || self.std_dev <= 0.0 {
            return Err(out_of_range(
                "standard deviation",
                format!("must be positive, got {}", self.std_dev),
            ));
        }
        Ok(())
    }
}

/// Classify a variable as qualitative or quantitative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifyRequest {
    pub sample_data: Vec<MixedValue>,
}

impl ClassifyRequest {
    pub fn new(sample_data: Vec<MixedValue>) -> InputResult<Self> {
        let request = Self { sample_data };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> InputResult<()> {
        if self.sample_data.is_empty() {
            return Err(InputError::Empty("variable values".to_string()));
        }
        Ok(())
    }
}

/// Any JSON request the service accepts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatRequest {
    Descriptive(DescriptiveRequest),
    Regression(RegressionRequest),
    TTestOneSample(OneSampleTTestRequest),
    TTestIndependent(TwoSampleTTestRequest),
    Anova(AnovaRequest),
    ChiSquare(ChiSquareRequest),
    SampleSize(SampleSizeRequest),
    Binomial(BinomialRequest),
    Poisson(PoissonRequest),
    Normal(NormalRequest),
    ClassifyVariable(ClassifyRequest),
}

impl StatRequest {
    pub fn descriptive(sample_data: Vec<f64>) -> InputResult<Self> {
        DescriptiveRequest::new(sample_data).map(Self::Descriptive)
    }

    pub fn regression(x_data: Vec<f64>, y_data: Vec<f64>) -> InputResult<Self> {
        RegressionRequest::new(x_data, y_data).map(Self::Regression)
    }

    pub fn t_test_one_sample(data: Vec<f64>, mu: f64) -> InputResult<Self> {
        OneSampleTTestRequest::new(data, mu).map(Self::TTestOneSample)
    }

    pub fn t_test_independent(group1: Vec<f64>, group2: Vec<f64>) -> InputResult<Self> {
        TwoSampleTTestRequest::new(group1, group2).map(Self::TTestIndependent)
    }

    pub fn anova(groups: Vec<Vec<f64>>) -> InputResult<Self> {
        AnovaRequest::new(groups).map(Self::Anova)
    }

    pub fn chi_square(observed_data: CountMatrix) -> InputResult<Self> {
        ChiSquareRequest::new(observed_data).map(Self::ChiSquare)
    }

    pub fn sample_size(
        confidence_level: f64,
        margin_error: f64,
        p: f64,
        population: Option<f64>,
    ) -> InputResult<Self> {
        SampleSizeRequest::new(confidence_level, margin_error, p, population).map(Self::SampleSize)
    }

    pub fn binomial(n: u64, p: f64, k: u64) -> InputResult<Self> {
        BinomialRequest::new(n, p, k).map(Self::Binomial)
    }

    pub fn poisson(lambda: f64, k: u64) -> InputResult<Self> {
        PoissonRequest::new(lambda, k).map(Self::Poisson)
    }

    pub fn normal(mean: f64, std_dev: f64, x: f64) -> InputResult<Self> {
        NormalRequest::new(mean, std_dev, x).map(Self::Normal)
    }

    pub fn classify(sample_data: Vec<MixedValue>) -> InputResult<Self> {
        ClassifyRequest::new(sample_data).map(Self::ClassifyVariable)
    }

    pub fn operation(&self) -> Operation {
        match self {
            StatRequest::Descriptive(_) => Operation::DescriptiveBasic,
            StatRequest::Regression(_) => Operation::Regression,
            StatRequest::TTestOneSample(_) => Operation::TTestOneSample,
            StatRequest::TTestIndependent(_) => Operation::TTestIndependent,
            StatRequest::Anova(_) => Operation::Anova,
            StatRequest::ChiSquare(_) => Operation::ChiSquare,
            StatRequest::SampleSize(_) => Operation::SampleSize,
            StatRequest::Binomial(_) => Operation::Binomial,
            StatRequest::Poisson(_) => Operation::Poisson,
            StatRequest::Normal(_) => Operation::Normal,
            StatRequest::ClassifyVariable(_) => Operation::ClassifyVariable,
        }
    }

    pub fn validate(&self) -> InputResult<()> {
        match self {
            StatRequest::Descriptive(r) => r.validate(),
            StatRequest::Regression(r) => r.validate(),
            StatRequest::TTestOneSample(r) => r.validate(),
            StatRequest::TTestIndependent(r) => r.validate(),
            StatRequest::Anova(r) => r.validate(),
            StatRequest::ChiSquare(r) => r.validate(),
            StatRequest::SampleSize(r) => r.validate(),
            StatRequest::Binomial(r) => r.validate(),
            StatRequest::Poisson(r) => r.validate(),
            StatRequest::Normal(r) => r.validate(),
            StatRequest::ClassifyVariable(r) => r.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stadix_io::parse_matrix;

    #[test]
    fn test_regression_mismatch_names_lengths() {
        let err = StatRequest::regression(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 4.0, 5.0, 4.0])
            .unwrap_err();
        assert_eq!(err, InputError::LengthMismatch { x_len: 5, y_len: 4 });
    }

    #[test]
    fn test_regression_needs_two_pairs() {
        assert!(StatRequest::regression(vec![1.0], vec![2.0]).is_err());
        assert!(StatRequest::regression(vec![1.0, 2.0], vec![2.0, 3.0]).is_ok());
    }

    #[test]
    fn test_t_tests_need_two_values() {
        assert!(StatRequest::t_test_one_sample(vec![5.0], 4.0).is_err());
        assert!(StatRequest::t_test_one_sample(vec![5.0, 6.0], f64::NAN).is_err());
        assert!(StatRequest::t_test_independent(vec![1.0, 2.0], vec![3.0]).is_err());
        assert!(StatRequest::t_test_independent(vec![1.0, 2.0], vec![3.0, 4.0]).is_ok());
    }

    #[test]
    fn test_anova_needs_three_groups_of_two() {
        let err = StatRequest::anova(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap_err();
        assert!(matches!(err, InputError::TooFewValues { min: 3, found: 2, .. }));

        let err = StatRequest::anova(vec![vec![1.0, 2.0], vec![3.0], vec![5.0, 6.0]]).unwrap_err();
        assert!(err.to_string().contains("group 2"));

        assert!(StatRequest::anova(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).is_ok());
    }

    #[test]
    fn test_chi_square_needs_two_columns() {
        let single = parse_matrix("1\n2").unwrap();
        assert!(StatRequest::chi_square(single).is_err());

        let table = parse_matrix("10, 20\n30, 40").unwrap();
        let request = StatRequest::chi_square(table).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"observed_data": [[10, 20], [30, 40]]})
        );
    }

    #[test]
    fn test_deserialized_matrix_is_checked() {
        let ragged = serde_json::from_value::<CountMatrix>(json!([[10, 20], [30]]));
        assert!(ragged.unwrap_err().to_string().contains("row 2"));
        assert!(serde_json::from_value::<CountMatrix>(json!([[10, 20]])).is_err());

        let matrix: CountMatrix = serde_json::from_value(json!([[10, 20], [30, 40]])).unwrap();
        assert_eq!(matrix.total(), 100);
    }

    #[test]
    fn test_sample_size_from_percentages() {
        let request = SampleSizeRequest::from_percentages(95.0, 5.0, 0.5, None).unwrap();
        assert!((request.confidence_level - 0.95).abs() < 1e-12);
        assert!((request.margin_error - 0.05).abs() < 1e-12);
        assert_eq!(
            serde_json::to_value(&request).unwrap()["population"],
            serde_json::Value::Null
        );

        assert!(SampleSizeRequest::from_percentages(100.0, 5.0, 0.5, None).is_err());
        assert!(SampleSizeRequest::from_percentages(95.0, 0.0, 0.5, None).is_err());
        assert!(SampleSizeRequest::from_percentages(95.0, 5.0, 1.5, None).is_err());
        assert!(SampleSizeRequest::from_percentages(95.0, 5.0, 0.5, Some(0.0)).is_err());
    }

    #[test]
    fn test_probability_requests() {
        assert!(StatRequest::binomial(10, 0.5, 11).is_err());
        assert!(StatRequest::binomial(10, -0.1, 3).is_err());
        assert!(StatRequest::poisson(0.0, 1).is_err());
        assert!(StatRequest::normal(0.0, 0.0, 1.0).is_err());

        let poisson = StatRequest::poisson(3.5, 2).unwrap();
        assert_eq!(serde_json::to_value(&poisson).unwrap(), json!({"lam": 3.5, "k": 2}));

        let normal = StatRequest::normal(100.0, 15.0, 115.0).unwrap();
        assert_eq!(
            serde_json::to_value(&normal).unwrap(),
            json!({"mean": 100.0, "std": 15.0, "x": 115.0})
        );
    }

    #[test]
    fn test_classify_keeps_mixed_values() {
        let request = StatRequest::classify(vec![
            MixedValue::Text("red".to_string()),
            MixedValue::Number(2.0),
        ])
        .unwrap();
        assert_eq!(request.operation(), Operation::ClassifyVariable);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"sample_data": ["red", 2.0]})
        );
        assert!(StatRequest::classify(vec![]).is_err());
    }

    #[test]
    fn test_field_mutation_caught_by_validate() {
        let mut request = DescriptiveRequest::new(vec![1.0]).unwrap();
        request.sample_data.clear();
        assert!(StatRequest::Descriptive(request).validate().is_err());
    }
}
