//! Result tables and automatic interpretations
//!
//! Statistics are shown with 4 decimals, p-values with 5, and probabilities
//! as percentages.

use serde::{Deserialize, Serialize};
use stadix_client::{StatRequest, StatResponse};

/// Significance level used for every decision
pub const ALPHA: f64 = 0.05;

/// Coefficient of variation (percent) above which the mean is not
/// considered representative
pub const CV_REPRESENTATIVE_LIMIT: f64 = 20.0;

/// |r| above which a correlation is strong
pub const STRONG_CORRELATION: f64 = 0.7;

/// |r| above which a correlation is moderate
pub const MODERATE_CORRELATION: f64 = 0.4;

/// A rendered result table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn key_value(title: &str) -> Self {
        Self::new(title, &["Statistic", "Value"])
    }

    fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    fn pair(self, label: &str, value: String) -> Self {
        self.row(vec![label.to_string(), value])
    }
}

pub fn fmt_stat(value: f64) -> String {
    format!("{value:.4}")
}

pub fn fmt_p(value: f64) -> String {
    format!("{value:.5}")
}

/// A probability in [0, 1] as a percentage
pub fn fmt_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// Shortest readable form of an input value: 95 rather than 95.0000
pub fn fmt_input(value: f64) -> String {
    let text = format!("{value:.4}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

pub fn is_significant(p_value: f64) -> bool {
    p_value < ALPHA
}

fn decision(p_value: f64) -> String {
    if is_significant(p_value) {
        format!("Significant (p < {ALPHA})")
    } else {
        format!("Not significant (p ≥ {ALPHA})")
    }
}

/// Strength of a Pearson correlation: "strong", "moderate" or "weak"
pub fn correlation_strength(r: f64) -> &'static str {
    if r.abs() > STRONG_CORRELATION {
        "strong"
    } else if r.abs() > MODERATE_CORRELATION {
        "moderate"
    } else {
        "weak"
    }
}

/// Tables for a result
pub fn render_tables(response: &StatResponse) -> Vec<Table> {
    match response {
        StatResponse::Descriptive(r) => {
            let s = &r.summary_stats;
            let mode = if s.mode.is_empty() {
                "No mode".to_string()
            } else {
                s.mode.iter().map(|m| fmt_stat(*m)).collect::<Vec<_>>().join(", ")
            };
            let summary = Table::key_value("Summary Statistics")
                .pair("n", s.n.to_string())
                .pair("Mean", fmt_stat(s.mean))
                .pair("Median", fmt_stat(s.median))
                .pair("Mode", mode)
                .pair("Variance", fmt_stat(s.variance))
                .pair("Standard deviation", fmt_stat(s.std_dev))
                .pair("Range", fmt_stat(s.range))
                .pair("Coefficient of variation", format!("{:.2}%", s.coeff_variation))
                .pair("Minimum", fmt_stat(s.min))
                .pair("Maximum", fmt_stat(s.max))
                .pair("Q1", fmt_stat(s.q1))
                .pair("Q3", fmt_stat(s.q3));

            let mut frequency = Table::new(
                "Frequency Table",
                &["Class", "Lower limit", "Upper limit", "Class mark", "f", "F", "fr", "%"],
            );
            for (i, row) in r.frequency_table.iter().enumerate() {
                frequency = frequency.row(vec![
                    (i + 1).to_string(),
                    fmt_stat(row.lower_limit),
                    fmt_stat(row.upper_limit),
                    fmt_stat(row.class_mark),
                    row.absolute_freq.to_string(),
                    row.cumulative_freq.to_string(),
                    fmt_stat(row.relative_freq),
                    format!("{:.2}%", row.percentage),
                ]);
            }
            vec![summary, frequency]
        }
        StatResponse::Regression(r) => {
            let fit = &r.linear_regression;
            vec![
                Table::key_value("Linear Regression")
                    .pair("Equation", fit.equation.clone())
                    .pair("Slope (m)", fmt_stat(fit.slope))
                    .pair("Intercept (b)", fmt_stat(fit.intercept))
                    .pair("Coefficient of determination (R²)", fmt_stat(fit.r_squared)),
                Table::key_value("Correlation")
                    .pair("Pearson r", fmt_stat(r.correlation.pearson_r))
                    .pair("Interpretation", r.correlation.interpretation.clone())
                    .pair("Covariance", fmt_stat(r.covariance)),
            ]
        }
        StatResponse::TTestOneSample(r) => vec![Table::key_value("One-Sample t-Test")
            .pair("Test statistic (t)", fmt_stat(r.statistic))
            .pair("p-value", fmt_p(r.p_value))
            .pair("Sample mean", fmt_stat(r.sample_mean))
            .pair("Theoretical mean (µ)", fmt_stat(r.theoretical_mean))
            .pair("Decision", decision(r.p_value))],
        StatResponse::TTestIndependent(r) => vec![Table::key_value("Independent Two-Sample t-Test")
            .pair("Test statistic (t)", fmt_stat(r.statistic))
            .pair("p-value", fmt_p(r.p_value))
            .pair("Mean of group 1", fmt_stat(r.mean_group1))
            .pair("Mean of group 2", fmt_stat(r.mean_group2))
            .pair("Difference", fmt_stat((r.mean_group1 - r.mean_group2).abs()))
            .pair("Decision", decision(r.p_value))],
        StatResponse::Anova(r) => {
            let mut means = Table::new("Group Means", &["Group", "Mean"]);
            for (i, m) in r.group_means.iter().enumerate() {
                means = means.row(vec![format!("Group {}", i + 1), fmt_stat(*m)]);
            }
            vec![
                Table::key_value("One-Way ANOVA")
                    .pair("Test statistic (F)", fmt_stat(r.statistic))
                    .pair("p-value", fmt_p(r.p_value))
                    .pair("Decision", decision(r.p_value)),
                means,
            ]
        }
        StatResponse::ChiSquare(r) => {
            let cols = r.expected_frequencies.first().map_or(0, Vec::len);
            let mut headers = vec![String::new()];
            headers.extend((1..=cols).map(|j| format!("Column {j}")));
            let expected = Table {
                title: "Expected Frequencies".to_string(),
                headers,
                rows: r
                    .expected_frequencies
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        std::iter::once(format!("Row {}", i + 1))
                            .chain(row.iter().map(|v| format!("{v:.2}")))
                            .collect()
                    })
                    .collect(),
            };
            vec![
                Table::key_value("Chi-Square Test of Independence")
                    .pair("Chi-square statistic", fmt_stat(r.statistic))
                    .pair("p-value", fmt_p(r.p_value))
                    .pair("Degrees of freedom", r.dof.to_string())
                    .pair("Decision", decision(r.p_value))
                    .pair("Interpretation", r.interpretation.clone()),
                expected,
            ]
        }
        StatResponse::SampleSize(r) => vec![Table::key_value("Sample Size")
            .pair("Sample size (n)", r.sample_size.to_string())
            .pair("Z score", fmt_stat(r.z_score))
            .pair("q = 1 - p", fmt_stat(r.q_value))
            .pair("Population", if r.is_finite { "Finite" } else { "Infinite" }.to_string())
            .pair("Formula", r.formula.clone())],
        StatResponse::Binomial(r) | StatResponse::Poisson(r) => {
            vec![Table::key_value(response.title())
                .pair("Exact probability P(X = k)", fmt_percent(r.prob_exact, 4))
                .pair("Cumulative probability P(X ≤ k)", fmt_percent(r.prob_accumulated, 4))
                .pair("Expected value", fmt_stat(r.expected_value))]
        }
        StatResponse::Normal(r) => vec![Table::key_value("Normal Distribution")
            .pair("P(X ≤ x)", fmt_percent(r.prob_left, 4))
            .pair("P(X > x)", fmt_percent(r.prob_right, 4))
            .pair("Z score", fmt_stat(r.z_score))],
        StatResponse::Classification(r) => {
            let mut charts = Table::new("Suggested Charts", &["Chart"]);
            for chart in &r.educational_info.suggested_charts {
                charts = charts.row(vec![chart.clone()]);
            }
            vec![
                Table::key_value("Variable Classification")
                    .pair("Type", r.variable_type.to_string())
                    .pair("Subtype", r.variable_subtype.clone())
                    .pair("Message", r.message.clone()),
                charts,
            ]
        }
    }
}

/// Label/value pairs of the first table, used when a result has no chart
pub fn key_values(response: &StatResponse) -> Vec<(String, String)> {
    render_tables(response)
        .into_iter()
        .next()
        .map(|table| {
            table
                .rows
                .into_iter()
                .filter_map(|row| {
                    let mut cells = row.into_iter();
                    Some((cells.next()?, cells.next()?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn test_sentence(service_text: &str, p_value: f64) -> String {
    format!(
        "{} {} Significance level: α = {ALPHA}.",
        service_text.trim(),
        decision(p_value)
    )
}

/// Automatic interpretation of a result
pub fn interpretation(response: &StatResponse) -> Option<String> {
    interpretation_with(response, None)
}

/// Automatic interpretation, worded with the submitted inputs when known
pub fn interpretation_with(response: &StatResponse, request: Option<&StatRequest>) -> Option<String> {
    let text = match response {
        StatResponse::Descriptive(r) => {
            let s = &r.summary_stats;
            let considerable = s.coeff_variation > CV_REPRESENTATIVE_LIMIT;
            format!(
                "The data have a mean of {:.2}. The dispersion is {} ({:.2}%), which indicates that the mean {} highly representative of the group.",
                s.mean,
                if considerable { "considerable" } else { "low" },
                s.coeff_variation,
                if considerable { "may not be" } else { "is" },
            )
        }
        StatResponse::Regression(r) => {
            let pearson = r.correlation.pearson_r;
            let strength = correlation_strength(pearson);
            let direction = if pearson > 0.0 { "positive" } else { "negative" };
            let advice = if pearson.abs() > STRONG_CORRELATION {
                "This suggests that X is a good predictor of Y."
            } else {
                "Use caution when predicting with this model because the correlation is low."
            };
            format!(
                "The analysis shows a {strength} {direction} relationship between the variables. The model explains {} of the variability in the data. {advice}",
                fmt_percent(r.linear_regression.r_squared, 2),
            )
        }
        StatResponse::TTestOneSample(r) => test_sentence(&r.interpretation, r.p_value),
        StatResponse::TTestIndependent(r) => test_sentence(&r.interpretation, r.p_value),
        StatResponse::Anova(r) => test_sentence(&r.interpretation, r.p_value),
        StatResponse::ChiSquare(r) => test_sentence(&r.interpretation, r.p_value),
        StatResponse::SampleSize(r) => match request {
            Some(StatRequest::SampleSize(inputs)) => {
                let population = match (r.is_finite, inputs.population) {
                    (true, Some(n)) => format!("from a total population of {} individuals", fmt_input(n)),
                    _ => "from an infinite population".to_string(),
                };
                format!(
                    "To obtain results with {}% confidence and a maximum margin of error of {}%, at least {} randomly selected elements must be surveyed or analyzed {population}.",
                    fmt_input(inputs.confidence_level * 100.0),
                    fmt_input(inputs.margin_error * 100.0),
                    r.sample_size,
                )
            }
            _ => format!(
                "At least {} randomly selected elements are required {}.",
                r.sample_size,
                if r.is_finite { "from the finite population" } else { "from an infinite population" }
            ),
        },
        StatResponse::Binomial(r) | StatResponse::Poisson(r) => {
            let k = match request {
                Some(StatRequest::Binomial(inputs)) => Some(inputs.k),
                Some(StatRequest::Poisson(inputs)) => Some(inputs.k),
                _ => None,
            };
            match k {
                Some(k) => format!(
                    "Under the given parameters, the probability that the event occurs exactly {k} times is {}.",
                    fmt_percent(r.prob_exact, 2)
                ),
                None => format!(
                    "Under the given parameters, the probability that the event occurs exactly k times is {}.",
                    fmt_percent(r.prob_exact, 2)
                ),
            }
        }
        StatResponse::Normal(r) => match request {
            Some(StatRequest::Normal(inputs)) => format!(
                "Given a mean of {} and a standard deviation of {}, there is a {} probability of finding a value less than or equal to {}.",
                fmt_input(inputs.mean),
                fmt_input(inputs.std_dev),
                fmt_percent(r.prob_left, 2),
                fmt_input(inputs.x),
            ),
            _ => format!(
                "There is a {} probability of finding a value less than or equal to x.",
                fmt_percent(r.prob_left, 2)
            ),
        },
        StatResponse::Classification(r) => {
            let parts: Vec<&str> = [r.message.trim(), r.educational_info.explanation.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            if parts.is_empty() {
                return None;
            }
            parts.join(" ")
        }
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stadix_client::{
        Correlation, DescriptiveResponse, FrequencyRow, LinearFit, NormalProbability,
        OneSampleTTestResponse, RegressionResponse, SampleSizeRequest, SampleSizeResponse,
        SummaryStats,
    };

    fn descriptive(cv: f64) -> StatResponse {
        StatResponse::Descriptive(DescriptiveResponse {
            summary_stats: SummaryStats {
                n: 4,
                mean: 10.0,
                median: 10.0,
                mode: vec![],
                variance: 4.0,
                std_dev: 2.0,
                range: 5.0,
                coeff_variation: cv,
                min: 7.5,
                max: 12.5,
                q1: 9.0,
                q3: 11.0,
            },
            frequency_table: vec![FrequencyRow {
                lower_limit: 7.5,
                upper_limit: 12.5,
                class_mark: 10.0,
                absolute_freq: 4,
                cumulative_freq: 4,
                relative_freq: 1.0,
                percentage: 100.0,
            }],
        })
    }

    fn regression(r: f64) -> StatResponse {
        StatResponse::Regression(RegressionResponse {
            linear_regression: LinearFit {
                slope: 0.6,
                intercept: 2.2,
                r_squared: r * r,
                equation: "y = 0.6x + 2.2".to_string(),
            },
            correlation: Correlation {
                pearson_r: r,
                interpretation: String::new(),
            },
            covariance: 1.5,
            raw_x: None,
            raw_y: None,
        })
    }

    #[test]
    fn test_descriptive_tables() {
        let tables = render_tables(&descriptive(20.0));
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[1], vec!["Mean".to_string(), "10.0000".to_string()]);
        assert_eq!(tables[0].rows[3][1], "No mode");
        assert_eq!(tables[1].headers.len(), tables[1].rows[0].len());
    }

    #[test]
    fn test_cv_threshold() {
        let low = interpretation(&descriptive(20.0)).unwrap();
        assert!(low.contains("low (20.00%)"));
        assert!(low.contains("mean is highly representative"));

        let high = interpretation(&descriptive(20.01)).unwrap();
        assert!(high.contains("considerable"));
        assert!(high.contains("may not be"));
    }

    #[test]
    fn test_correlation_bands() {
        assert_eq!(correlation_strength(0.71), "strong");
        assert_eq!(correlation_strength(-0.7), "moderate");
        assert_eq!(correlation_strength(0.41), "moderate");
        assert_eq!(correlation_strength(0.4), "weak");

        let text = interpretation(&regression(-0.85)).unwrap();
        assert!(text.contains("strong negative"));
        assert!(text.contains("good predictor"));

        let text = interpretation(&regression(0.5)).unwrap();
        assert!(text.contains("moderate positive"));
        assert!(text.contains("caution"));
    }

    #[test]
    fn test_p_value_formatting_and_decision() {
        let response = StatResponse::TTestOneSample(OneSampleTTestResponse {
            statistic: 2.345678,
            p_value: 0.0499,
            sample_mean: 5.2,
            theoretical_mean: 5.0,
            interpretation: "Reject H0".to_string(),
        });
        let table = &render_tables(&response)[0];
        assert_eq!(table.rows[0][1], "2.3457");
        assert_eq!(table.rows[1][1], "0.04990");
        assert!(table.rows[4][1].starts_with("Significant"));

        let text = interpretation(&response).unwrap();
        assert!(text.starts_with("Reject H0"));
        assert!(text.contains("α = 0.05"));

        assert!(!is_significant(0.05));
    }

    #[test]
    fn test_sample_size_sentence() {
        let response = StatResponse::SampleSize(SampleSizeResponse {
            sample_size: 278,
            z_score: 1.96,
            q_value: 0.5,
            formula: "n = N Z^2 p q / (e^2 (N - 1) + Z^2 p q)".to_string(),
            is_finite: true,
        });
        let request = StatRequest::SampleSize(
            SampleSizeRequest::from_percentages(95.0, 5.0, 0.5, Some(1000.0)).unwrap(),
        );
        let text = interpretation_with(&response, Some(&request)).unwrap();
        assert!(text.contains("95% confidence"));
        assert!(text.contains("margin of error of 5%"));
        assert!(text.contains("at least 278"));
        assert!(text.contains("population of 1000 individuals"));
    }

    #[test]
    fn test_normal_sentence_uses_inputs() {
        let response = StatResponse::Normal(NormalProbability {
            prob_left: 0.841344,
            prob_right: 0.158656,
            z_score: 1.0,
        });
        let request = StatRequest::normal(100.0, 15.0, 115.0).unwrap();
        let text = interpretation_with(&response, Some(&request)).unwrap();
        assert!(text.contains("84.13%"));
        assert!(text.contains("equal to 115"));

        assert_eq!(render_tables(&response)[0].rows[0][1], "84.1344%");
    }

    #[test]
    fn test_key_values_from_first_table() {
        let pairs = key_values(&descriptive(5.0));
        assert_eq!(pairs[0], ("n".to_string(), "4".to_string()));
    }

    #[test]
    fn test_fmt_input() {
        assert_eq!(fmt_input(95.0), "95");
        assert_eq!(fmt_input(0.5), "0.5");
        assert_eq!(fmt_input(1000.0), "1000");
    }
}
