//! Endpoint catalogue of the statistics service

use serde::{Deserialize, Serialize};

/// A statistics operation exposed by the service.
///
/// Every operation is a single `POST` under `/api/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    DescriptiveBasic,
    DescriptiveUpload,
    Regression,
    RegressionUpload,
    TTestOneSample,
    TTestIndependent,
    Anova,
    ChiSquare,
    SampleSize,
    Binomial,
    Poisson,
    Normal,
    ClassifyVariable,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::DescriptiveBasic,
        Operation::DescriptiveUpload,
        Operation::Regression,
        Operation::RegressionUpload,
        Operation::TTestOneSample,
        Operation::TTestIndependent,
        Operation::Anova,
        Operation::ChiSquare,
        Operation::SampleSize,
        Operation::Binomial,
        Operation::Poisson,
        Operation::Normal,
        Operation::ClassifyVariable,
    ];

    /// Path relative to the service base URL
    pub fn path(&self) -> &'static str {
        match self {
            Operation::DescriptiveBasic => "/api/v1/descriptive/basic",
            Operation::DescriptiveUpload => "/api/v1/descriptive/upload",
            Operation::Regression => "/api/v1/inference/regression",
            Operation::RegressionUpload => "/api/v1/inference/upload",
            Operation::TTestOneSample => "/api/v1/hypothesis/t-test-one",
            Operation::TTestIndependent => "/api/v1/hypothesis/t-test-ind",
            Operation::Anova => "/api/v1/hypothesis/anova",
            Operation::ChiSquare => "/api/v1/nonparametric/chi-square",
            Operation::SampleSize => "/api/v1/sampling/calculate",
            Operation::Binomial => "/api/v1/probability/binomial",
            Operation::Poisson => "/api/v1/probability/poisson",
            Operation::Normal => "/api/v1/probability/normal",
            Operation::ClassifyVariable => "/api/v1/variables/analyze",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::DescriptiveBasic => "descriptive",
            Operation::DescriptiveUpload => "descriptive upload",
            Operation::Regression => "regression",
            Operation::RegressionUpload => "regression upload",
            Operation::TTestOneSample => "one-sample t-test",
            Operation::TTestIndependent => "independent t-test",
            Operation::Anova => "ANOVA",
            Operation::ChiSquare => "chi-square",
            Operation::SampleSize => "sample size",
            Operation::Binomial => "binomial",
            Operation::Poisson => "Poisson",
            Operation::Normal => "normal",
            Operation::ClassifyVariable => "variable classification",
        }
    }

    /// Whether the operation takes a multipart file instead of JSON
    pub fn is_upload(&self) -> bool {
        matches!(self, Operation::DescriptiveUpload | Operation::RegressionUpload)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which analysis an uploaded spreadsheet feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Descriptive,
    Regression,
}

impl UploadKind {
    pub fn operation(&self) -> Operation {
        match self {
            UploadKind::Descriptive => Operation::DescriptiveUpload,
            UploadKind::Regression => Operation::RegressionUpload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique_and_versioned() {
        let paths: HashSet<_> = Operation::ALL.iter().map(|op| op.path()).collect();
        assert_eq!(paths.len(), Operation::ALL.len());
        assert!(Operation::ALL.iter().all(|op| op.path().starts_with("/api/v1/")));
    }

    #[test]
    fn test_upload_operations() {
        assert_eq!(UploadKind::Descriptive.operation(), Operation::DescriptiveUpload);
        assert_eq!(UploadKind::Regression.operation(), Operation::RegressionUpload);
        assert_eq!(Operation::ALL.iter().filter(|op| op.is_upload()).count(), 2);
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(Operation::ChiSquare.to_string(), "chi-square");
    }
}
