//! Typed, validated service responses
//!
//! Bodies are decoded with serde into one payload struct per operation and
//! then checked by `validate()`. Anything that would otherwise surface as a
//! rendering failure (a missing field, a NaN smuggled in as a string, a
//! ragged expected-frequency matrix) is reported here as
//! [`ClientError::MalformedResponse`] naming the offending field.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::operation::Operation;

/// Slack allowed on values that must lie in [0, 1]
const UNIT_TOLERANCE: f64 = 1e-9;

/// Accept `385` or `385.0` for counts, reject anything fractional
fn integral<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative whole number, got {value}"
        )))
    }
}

/// Field checks bound to one operation, so every failure names it
struct Check {
    operation: Operation,
}

impl Check {
    fn fail(&self, field: &str, reason: impl Into<String>) -> ClientError {
        ClientError::malformed(self.operation, field, reason)
    }

    fn finite(&self, field: &str, value: f64) -> ClientResult<()> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(self.fail(field, format!("is not a finite number ({value})")))
        }
    }

    fn all_finite(&self, field: &str, values: &[f64]) -> ClientResult<()> {
        for (i, &value) in values.iter().enumerate() {
            self.finite(&format!("{field}[{i}]"), value)?;
        }
        Ok(())
    }

    fn non_negative(&self, field: &str, value: f64) -> ClientResult<()> {
        self.finite(field, value)?;
        if value < 0.0 {
            return Err(self.fail(field, format!("is negative ({value})")));
        }
        Ok(())
    }

    fn unit(&self, field: &str, value: f64) -> ClientResult<()> {
        self.finite(field, value)?;
        if value < -UNIT_TOLERANCE || value > 1.0 + UNIT_TOLERANCE {
            return Err(self.fail(field, format!("is outside [0, 1] ({value})")));
        }
        Ok(())
    }

    fn correlation(&self, field: &str, value: f64) -> ClientResult<()> {
        self.finite(field, value)?;
        if value.abs() > 1.0 + UNIT_TOLERANCE {
            return Err(self.fail(field, format!("is outside [-1, 1] ({value})")));
        }
        Ok(())
    }
}

// ============================================================================
// Descriptive statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(deserialize_with = "integral")]
    pub n: u64,
    pub mean: f64,
    pub median: f64,
    /// Empty when no value repeats
    #[serde(default)]
    pub mode: Vec<f64>,
    pub variance: f64,
    pub std_dev: f64,
    pub range: f64,
    /// Coefficient of variation, in percent
    pub coeff_variation: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

/// One class of a grouped frequency table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub class_mark: f64,
    #[serde(deserialize_with = "integral")]
    pub absolute_freq: u64,
    #[serde(deserialize_with = "integral")]
    pub cumulative_freq: u64,
    pub relative_freq: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveResponse {
    pub summary_stats: SummaryStats,
    pub frequency_table: Vec<FrequencyRow>,
}

impl DescriptiveResponse {
    fn validate(&self, check: &Check) -> ClientResult<()> {
        let s = &self.summary_stats;
        for (field, value) in [
            ("summary_stats.mean", s.mean),
            ("summary_stats.median", s.median),
            ("summary_stats.range", s.range),
            ("summary_stats.coeff_variation", s.coeff_variation),
            ("summary_stats.min", s.min),
            ("summary_stats.max", s.max),
            ("summary_stats.q1", s.q1),
            ("summary_stats.q3", s.q3),
        ] {
            check.finite(field, value)?;
        }
        check.non_negative("summary_stats.variance", s.variance)?;
        check.non_negative("summary_stats.std_dev", s.std_dev)?;
        check.all_finite("summary_stats.mode", &s.mode)?;
        if s.min > s.max {
            return Err(check.fail("summary_stats.min", "is greater than max"));
        }

        let mut previous = 0;
        for (i, row) in self.frequency_table.iter().enumerate() {
            let field = |name: &str| format!("frequency_table[{i}].{name}");
            check.finite(&field("lower_limit"), row.lower_limit)?;
            check.finite(&field("upper_limit"), row.upper_limit)?;
            check.finite(&field("class_mark"), row.class_mark)?;
            check.unit(&field("relative_freq"), row.relative_freq)?;
            check.non_negative(&field("percentage"), row.percentage)?;
            if row.lower_limit > row.upper_limit {
                return Err(check.fail(&field("lower_limit"), "is above upper_limit"));
            }
            if row.cumulative_freq < previous {
                return Err(check.fail(&field("cumulative_freq"), "decreases"));
            }
            previous = row.cumulative_freq;
        }
        Ok(())
    }
}

// ============================================================================
// Regression and correlation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub equation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub pearson_r: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResponse {
    pub linear_regression: LinearFit,
    pub correlation: Correlation,
    pub covariance: f64,
    /// Observations the fit was computed on; filled in from the request
    /// when the service does not echo them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_x: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_y: Option<Vec<f64>>,
}

impl RegressionResponse {
    fn validate(&self, check: &Check) -> ClientResult<()> {
        check.finite("linear_regression.slope", self.linear_regression.slope)?;
        check.finite("linear_regression.intercept", self.linear_regression.intercept)?;
        check.unit("linear_regression.r_squared", self.linear_regression.r_squared)?;
        check.correlation("correlation.pearson_r", self.correlation.pearson_r)?;
        check.finite("covariance", self.covariance)?;

        match (&self.raw_x, &self.raw_y) {
            (Some(x), Some(y)) => {
                check.all_finite("raw_x", x)?;
                check.all_finite("raw_y", y)?;
                if x.len() != y.len() {
                    return Err(check.fail(
                        "raw_y",
                        format!("has {} values but raw_x has {}", y.len(), x.len()),
                    ));
                }
            }
            (Some(_), None) => return Err(check.fail("raw_y", "is missing while raw_x is present")),
            (None, Some(_)) => return Err(check.fail("raw_x", "is missing while raw_y is present")),
            (None, None) => {}
        }
        Ok(())
    }

    /// Observed points as (x, y) pairs
    pub fn points(&self) -> Vec<(f64, f64)> {
        match (&self.raw_x, &self.raw_y) {
            (Some(x), Some(y)) => x.iter().copied().zip(y.iter().copied()).collect(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// Hypothesis tests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneSampleTTestResponse {
    pub statistic: f64,
    pub p_value: f64,
    pub sample_mean: f64,
    pub theoretical_mean: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoSampleTTestResponse {
    pub statistic: f64,
    pub p_value: f64,
    pub mean_group1: f64,
    pub mean_group2: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResponse {
    pub statistic: f64,
    pub p_value: f64,
    pub group_means: Vec<f64>,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResponse {
    pub statistic: f64,
    pub p_value: f64,
    #[serde(deserialize_with = "integral")]
    pub dof: u64,
    pub expected_frequencies: Vec<Vec<f64>>,
    pub is_significant: bool,
    pub interpretation: String,
}

impl ChiSquareResponse {
    fn validate(&self, check: &Check) -> ClientResult<()> {
        check.non_negative("statistic", self.statistic)?;
        check.unit("p_value", self.p_value)?;

        let width = self.expected_frequencies.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(check.fail("expected_frequencies", "is empty"));
        }
        for (i, row) in self.expected_frequencies.iter().enumerate() {
            if row.len() != width {
                return Err(check.fail(
                    &format!("expected_frequencies[{i}]"),
                    format!("has {} columns, expected {width}", row.len()),
                ));
            }
            check.all_finite(&format!("expected_frequencies[{i}]"), row)?;
        }
        Ok(())
    }
}

// ============================================================================
// Sampling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeResponse {
    #[serde(deserialize_with = "integral")]
    pub sample_size: u64,
    pub z_score: f64,
    pub q_value: f64,
    pub formula: String,
    pub is_finite: bool,
}

// ============================================================================
// Probability distributions
// ============================================================================

/// Binomial and Poisson results share one shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteProbability {
    /// P(X = k)
    pub prob_exact: f64,
    /// P(X ≤ k)
    pub prob_accumulated: f64,
    pub expected_value: f64,
}

impl DiscreteProbability {
    fn validate(&self, check: &Check) -> ClientResult<()> {
        check.unit("prob_exact", self.prob_exact)?;
        check.unit("prob_accumulated", self.prob_accumulated)?;
        check.non_negative("expected_value", self.expected_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalProbability {
    /// P(X ≤ x)
    pub prob_left: f64,
    /// P(X > x)
    pub prob_right: f64,
    pub z_score: f64,
}

// ============================================================================
// Variable classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[serde(alias = "Cualitativa", alias = "cualitativa", alias = "Qualitative")]
    Qualitative,
    #[serde(alias = "Cuantitativa", alias = "cuantitativa", alias = "Quantitative")]
    Quantitative,
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Qualitative => write!(f, "Qualitative"),
            VariableType::Quantitative => write!(f, "Quantitative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationalInfo {
    pub explanation: String,
    #[serde(default)]
    pub suggested_charts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub variable_type: VariableType,
    pub variable_subtype: String,
    pub message: String,
    pub educational_info: EducationalInfo,
}

// ============================================================================
// Tagged response
// ============================================================================

/// A validated result, tagged with the operation that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", content = "result", rename_all = "snake_case")]
pub enum StatResponse {
    Descriptive(DescriptiveResponse),
    Regression(RegressionResponse),
    TTestOneSample(OneSampleTTestResponse),
    TTestIndependent(TwoSampleTTestResponse),
    Anova(AnovaResponse),
    ChiSquare(ChiSquareResponse),
    SampleSize(SampleSizeResponse),
    Binomial(DiscreteProbability),
    Poisson(DiscreteProbability),
    Normal(NormalProbability),
    Classification(ClassificationResponse),
}

fn decode<T: for<'de> Deserialize<'de>>(operation: Operation, body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|e| {
        let reason = e.to_string();
        let field = missing_field(&reason).unwrap_or("body").to_string();
        ClientError::malformed(operation, field, reason)
    })
}

/// Pull the field name out of serde's "missing field `x`" message
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

impl StatResponse {
    /// Decode and validate a 2xx body for `operation`
    pub fn parse(operation: Operation, body: &str) -> ClientResult<Self> {
        let response = match operation {
            Operation::DescriptiveBasic | Operation::DescriptiveUpload => {
                StatResponse::Descriptive(decode(operation, body)?)
            }
            Operation::Regression | Operation::RegressionUpload => {
                StatResponse::Regression(decode(operation, body)?)
            }
            Operation::TTestOneSample => StatResponse::TTestOneSample(decode(operation, body)?),
            Operation::TTestIndependent => StatResponse::TTestIndependent(decode(operation, body)?),
            Operation::Anova => StatResponse::Anova(decode(operation, body)?),
            Operation::ChiSquare => StatResponse::ChiSquare(decode(operation, body)?),
            Operation::SampleSize => StatResponse::SampleSize(decode(operation, body)?),
            Operation::Binomial => StatResponse::Binomial(decode(operation, body)?),
            Operation::Poisson => StatResponse::Poisson(decode(operation, body)?),
            Operation::Normal => StatResponse::Normal(decode(operation, body)?),
            Operation::ClassifyVariable => StatResponse::Classification(decode(operation, body)?),
        };
        response.validate(operation)?;
        Ok(response)
    }

    /// Check numeric fields and structural invariants
    pub fn validate(&self, operation: Operation) -> ClientResult<()> {
        let check = Check { operation };
        match self {
            StatResponse::Descriptive(r) => r.validate(&check),
            StatResponse::Regression(r) => r.validate(&check),
            StatResponse::TTestOneSample(r) => {
                check.finite("statistic", r.statistic)?;
                check.unit("p_value", r.p_value)?;
                check.finite("sample_mean", r.sample_mean)?;
                check.finite("theoretical_mean", r.theoretical_mean)
            }
            StatResponse::TTestIndependent(r) => {
                check.finite("statistic", r.statistic)?;
                check.unit("p_value", r.p_value)?;
                check.finite("mean_group1", r.mean_group1)?;
                check.finite("mean_group2", r.mean_group2)
            }
            StatResponse::Anova(r) => {
                check.non_negative("statistic", r.statistic)?;
                check.unit("p_value", r.p_value)?;
                if r.group_means.is_empty() {
                    return Err(check.fail("group_means", "is empty"));
                }
                check.all_finite("group_means", &r.group_means)
            }
            StatResponse::ChiSquare(r) => r.validate(&check),
            StatResponse::SampleSize(r) => {
                check.finite("z_score", r.z_score)?;
                check.unit("q_value", r.q_value)
            }
            StatResponse::Binomial(r) | StatResponse::Poisson(r) => r.validate(&check),
            StatResponse::Normal(r) => {
                check.unit("prob_left", r.prob_left)?;
                check.unit("prob_right", r.prob_right)?;
                check.finite("z_score", r.z_score)
            }
            StatResponse::Classification(_) => Ok(()),
        }
    }

    /// p-value of a hypothesis or chi-square test
    pub fn p_value(&self) -> Option<f64> {
        match self {
            StatResponse::TTestOneSample(r) => Some(r.p_value),
            StatResponse::TTestIndependent(r) => Some(r.p_value),
            StatResponse::Anova(r) => Some(r.p_value),
            StatResponse::ChiSquare(r) => Some(r.p_value),
            _ => None,
        }
    }

    /// Short title used for tables and reports
    pub fn title(&self) -> &'static str {
        match self {
            StatResponse::Descriptive(_) => "Descriptive Statistics",
            StatResponse::Regression(_) => "Linear Regression and Correlation",
            StatResponse::TTestOneSample(_) => "One-Sample t-Test",
            StatResponse::TTestIndependent(_) => "Independent Two-Sample t-Test",
            StatResponse::Anova(_) => "One-Way ANOVA",
            StatResponse::ChiSquare(_) => "Chi-Square Test of Independence",
            StatResponse::SampleSize(_) => "Sample Size",
            StatResponse::Binomial(_) => "Binomial Distribution",
            StatResponse::Poisson(_) => "Poisson Distribution",
            StatResponse::Normal(_) => "Normal Distribution",
            StatResponse::Classification(_) => "Variable Classification",
        }
    }
}
