//! Chart data for each kind of result

use serde::{Deserialize, Serialize};
use stadix_client::StatResponse;
use stadix_stats::ChartSeries;

/// How a frequency table is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyChart {
    /// Histogram of absolute frequencies
    #[default]
    Bars,
    /// Frequency polygon through the class marks
    Polygon,
    /// Share of each class
    Pie,
}

/// Plot-ready data derived from a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartData {
    /// Labelled bars: frequency histogram or means comparison
    Bars {
        labels: Vec<String>,
        values: Vec<f64>,
        /// Index of the bar drawn in the reference colour
        highlight: Option<usize>,
        y_label: String,
    },
    /// Points joined by straight segments
    Polygon {
        labels: Vec<String>,
        values: Vec<f64>,
        y_label: String,
    },
    /// Slices proportional to each value
    Pie { labels: Vec<String>, values: Vec<f64> },
    /// Observations with the fitted line y = slope·x + intercept
    Scatter {
        points: Vec<(f64, f64)>,
        slope: f64,
        intercept: f64,
    },
    /// Synthesized probability distribution
    Distribution { series: ChartSeries },
}

impl ChartData {
    pub fn kind(&self) -> &'static str {
        match self {
            ChartData::Bars { .. } => "bars",
            ChartData::Polygon { .. } => "polygon",
            ChartData::Pie { .. } => "pie",
            ChartData::Scatter { .. } => "scatter",
            ChartData::Distribution { .. } => "distribution",
        }
    }
}

/// Chart for a result, if it has one.
///
/// Probability results use the synthesized `series`; without it they have
/// no chart. Sample sizes and classifications never do.
pub fn chart_series(response: &StatResponse, series: Option<&ChartSeries>) -> Option<ChartData> {
    chart_series_with(response, series, FrequencyChart::default())
}

/// Like [`chart_series`], drawing frequency tables as `frequency`
pub fn chart_series_with(
    response: &StatResponse,
    series: Option<&ChartSeries>,
    frequency: FrequencyChart,
) -> Option<ChartData> {
    match response {
        StatResponse::Descriptive(r) => {
            if r.frequency_table.is_empty() {
                return None;
            }
            let labels: Vec<String> = r
                .frequency_table
                .iter()
                .map(|row| format!("{:.2}", row.class_mark))
                .collect();
            let values: Vec<f64> = r
                .frequency_table
                .iter()
                .map(|row| row.absolute_freq as f64)
                .collect();
            let y_label = "Absolute frequency".to_string();
            Some(match frequency {
                FrequencyChart::Bars => ChartData::Bars {
                    labels,
                    values,
                    highlight: None,
                    y_label,
                },
                FrequencyChart::Polygon => ChartData::Polygon {
                    labels,
                    values,
                    y_label,
                },
                FrequencyChart::Pie => ChartData::Pie { labels, values },
            })
        }
        StatResponse::Regression(r) => Some(ChartData::Scatter {
            points: r.points(),
            slope: r.linear_regression.slope,
            intercept: r.linear_regression.intercept,
        }),
        StatResponse::TTestOneSample(r) => Some(means(
            vec!["Sample".to_string(), "Theoretical (µ)".to_string()],
            vec![r.sample_mean, r.theoretical_mean],
            Some(1),
        )),
        StatResponse::TTestIndependent(r) => Some(means(
            vec!["Group 1".to_string(), "Group 2".to_string()],
            vec![r.mean_group1, r.mean_group2],
            None,
        )),
        StatResponse::Anova(r) => Some(means(
            (1..=r.group_means.len()).map(|i| format!("Group {i}")).collect(),
            r.group_means.clone(),
            None,
        )),
        StatResponse::ChiSquare(r) => {
            let cols = r.expected_frequencies.first().map_or(0, Vec::len);
            let mut labels = Vec::new();
            let mut values = Vec::new();
            for (i, row) in r.expected_frequencies.iter().enumerate() {
                for (j, &value) in row.iter().enumerate().take(cols) {
                    labels.push(format!("R{}C{}", i + 1, j + 1));
                    values.push(value);
                }
            }
            Some(ChartData::Bars {
                labels,
                values,
                highlight: None,
                y_label: "Expected frequency".to_string(),
            })
        }
        StatResponse::Binomial(_) | StatResponse::Poisson(_) | StatResponse::Normal(_) => {
            series.map(|s| ChartData::Distribution { series: s.clone() })
        }
        StatResponse::SampleSize(_) | StatResponse::Classification(_) => None,
    }
}

fn means(labels: Vec<String>, values: Vec<f64>, highlight: Option<usize>) -> ChartData {
    ChartData::Bars {
        labels,
        values,
        highlight,
        y_label: "Mean".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stadix_client::{AnovaResponse, SampleSizeResponse};
    use stadix_stats::Distribution;

    #[test]
    fn test_anova_means_bars() {
        let response = StatResponse::Anova(AnovaResponse {
            statistic: 4.2,
            p_value: 0.03,
            group_means: vec![1.0, 2.0, 3.0],
            interpretation: "differences".to_string(),
        });
        match chart_series(&response, None).unwrap() {
            ChartData::Bars { labels, values, .. } => {
                assert_eq!(labels, vec!["Group 1", "Group 2", "Group 3"]);
                assert_eq!(values, vec![1.0, 2.0, 3.0]);
            }
            other => panic!("unexpected chart {}", other.kind()),
        }
    }

    fn descriptive() -> StatResponse {
        let body = serde_json::json!({
            "summary_stats": {
                "n": 6, "mean": 3.5, "median": 3.5, "mode": [], "variance": 3.5,
                "std_dev": 1.87, "range": 5.0, "coeff_variation": 53.45,
                "min": 1.0, "max": 6.0, "q1": 2.0, "q3": 5.0
            },
            "frequency_table": [
                {"lower_limit": 1.0, "upper_limit": 3.5, "class_mark": 2.25,
                 "absolute_freq": 2, "cumulative_freq": 2, "relative_freq": 0.3333, "percentage": 33.33},
                {"lower_limit": 3.5, "upper_limit": 6.0, "class_mark": 4.75,
                 "absolute_freq": 4, "cumulative_freq": 6, "relative_freq": 0.6667, "percentage": 66.67}
            ]
        });
        StatResponse::parse(stadix_client::Operation::DescriptiveBasic, &body.to_string()).unwrap()
    }

    #[test]
    fn test_frequency_chart_kinds() {
        let response = descriptive();
        assert_eq!(chart_series(&response, None).unwrap().kind(), "bars");
        assert_eq!(
            chart_series_with(&response, None, FrequencyChart::Polygon).unwrap().kind(),
            "polygon"
        );
        match chart_series_with(&response, None, FrequencyChart::Pie).unwrap() {
            ChartData::Pie { labels, values } => {
                assert_eq!(labels, vec!["2.25", "4.75"]);
                assert_eq!(values, vec![2.0, 4.0]);
            }
            other => panic!("unexpected chart {}", other.kind()),
        }
    }

    #[test]
    fn test_frequency_chart_only_affects_descriptive() {
        let response = StatResponse::Anova(AnovaResponse {
            statistic: 4.2,
            p_value: 0.03,
            group_means: vec![1.0, 2.0, 3.0],
            interpretation: "differences".to_string(),
        });
        assert_eq!(
            chart_series_with(&response, None, FrequencyChart::Pie).unwrap().kind(),
            "bars"
        );
    }

    #[test]
    fn test_sample_size_has_no_chart() {
        let response = StatResponse::SampleSize(SampleSizeResponse {
            sample_size: 385,
            z_score: 1.96,
            q_value: 0.5,
            formula: "n".to_string(),
            is_finite: false,
        });
        assert!(chart_series(&response, None).is_none());
    }

    #[test]
    fn test_probability_uses_series() {
        let response = StatResponse::Binomial(stadix_client::DiscreteProbability {
            prob_exact: 0.246,
            prob_accumulated: 0.623,
            expected_value: 5.0,
        });
        assert!(chart_series(&response, None).is_none());

        let series = Distribution::Binomial { n: 10, p: 0.5, k: 5 }.synthesize().unwrap();
        let chart = chart_series(&response, Some(&series)).unwrap();
        assert_eq!(chart.kind(), "distribution");
    }
}
