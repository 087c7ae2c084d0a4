//! Lexical parsing of manually entered data
//!
//! Students type datasets as `"10, 12, 23"`, contingency tables as one row
//! per line, and single parameters such as `"0,5"` with a decimal comma.

use serde::{Deserialize, Serialize};

use crate::error::{InputError, InputResult};

/// A token that could not be read as a finite number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedToken {
    /// Zero-based position among the non-empty tokens
    pub position: usize,
    /// The offending text, trimmed
    pub token: String,
}

/// Numbers read from a comma-separated list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericInput {
    /// Accepted values, in input order
    pub values: Vec<f64>,
    /// Tokens that were skipped
    pub rejected: Vec<RejectedToken>,
}

impl NumericInput {
    /// Number of accepted values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every non-empty token was numeric
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Consume into the accepted values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

/// Parse a comma-separated list of numbers.
///
/// Empty tokens are ignored. Tokens that are not finite numbers are dropped
/// and recorded in [`NumericInput::rejected`].
pub fn parse_numbers(text: &str) -> NumericInput {
    let mut input = NumericInput::default();

    for (position, token) in tokens(text).enumerate() {
        match parse_finite(token) {
            Some(value) => input.values.push(value),
            None => {
                tracing::warn!(token, position, "skipping non-numeric token");
                input.rejected.push(RejectedToken {
                    position,
                    token: token.to_string(),
                });
            }
        }
    }

    input
}

/// Parse a single scalar parameter, accepting a decimal comma (`"5,2"`).
pub fn parse_scalar(text: &str, name: &str) -> InputResult<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty(name.to_string()));
    }

    let normalized = if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        trimmed.replacen(',', ".", 1)
    };

    parse_finite(&normalized).ok_or_else(|| InputError::InvalidNumber {
        token: trimmed.to_string(),
    })
}

/// A value whose kind is not known in advance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MixedValue {
    Number(f64),
    Text(String),
}

impl MixedValue {
    pub fn is_number(&self) -> bool {
        matches!(self, MixedValue::Number(_))
    }
}

/// Parse a comma-separated list where each token is kept as a number when
/// it reads as one and as text otherwise.
pub fn parse_mixed(text: &str) -> Vec<MixedValue> {
    tokens(text)
        .map(|token| match parse_finite(token) {
            Some(value) => MixedValue::Number(value),
            None => MixedValue::Text(token.to_string()),
        })
        .collect()
}

/// Observed counts of a contingency table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u64>>", into = "Vec<Vec<u64>>")]
pub struct CountMatrix {
    rows: Vec<Vec<u64>>,
}

impl TryFrom<Vec<Vec<u64>>> for CountMatrix {
    type Error = InputError;

    fn try_from(rows: Vec<Vec<u64>>) -> InputResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<CountMatrix> for Vec<Vec<u64>> {
    fn from(matrix: CountMatrix) -> Self {
        matrix.rows
    }
}

impl CountMatrix {
    /// Build from rows, checking the table is rectangular with at least two rows
    pub fn from_rows(rows: Vec<Vec<u64>>) -> InputResult<Self> {
        if rows.len() < 2 {
            return Err(InputError::TooFewRows {
                min: 2,
                found: rows.len(),
            });
        }

        let expected = rows[0].len();
        if expected == 0 {
            return Err(InputError::Empty("first matrix row".to_string()));
        }
        for (i, row) in rows.iter().enumerate().skip(1) {
            if row.len() != expected {
                return Err(InputError::NotRectangular {
                    row: i + 1,
                    expected,
                    found: row.len(),
                });
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Sum of all observed counts
    pub fn total(&self) -> u64 {
        self.rows.iter().flatten().sum()
    }
}

/// Parse a contingency table: one row per line, cells separated by commas.
///
/// Blank lines are skipped. Every row must have as many cells as the first.
pub fn parse_matrix(text: &str) -> InputResult<CountMatrix> {
    let mut rows = Vec::new();

    for line in text.lines() {
        let row = tokens(line)
            .map(|cell| {
                cell.parse::<u64>().map_err(|_| InputError::InvalidNumber {
                    token: cell.to_string(),
                })
            })
            .collect::<InputResult<Vec<u64>>>()?;

        if !row.is_empty() {
            rows.push(row);
        }
    }

    CountMatrix::from_rows(rows)
}

/// Check that a list has at least `min` values
pub fn require_len(values: &[f64], min: usize, label: &str) -> InputResult<()> {
    if values.is_empty() && min > 0 {
        return Err(InputError::Empty(label.to_string()));
    }
    if values.len() < min {
        return Err(InputError::TooFewValues {
            label: label.to_string(),
            min,
            found: values.len(),
        });
    }
    Ok(())
}

/// Check that paired observations have the same length
pub fn paired(x: &[f64], y: &[f64]) -> InputResult<()> {
    if x.len() != y.len() {
        return Err(InputError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    Ok(())
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|t| !t.is_empty())
}

fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}
