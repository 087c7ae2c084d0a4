//! Local CSV reading of positional numeric columns
//!
//! Mirrors how the service reads uploads: data lives in the first one or two
//! columns, an optional header row is detected, and non-numeric rows are
//! skipped.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{InputError, InputResult};

/// Numeric columns read from a CSV source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvColumns {
    /// Header names, when the first record was a header
    pub headers: Option<Vec<String>>,
    /// One vector per requested column, all of equal length
    pub columns: Vec<Vec<f64>>,
    /// Records skipped because a wanted cell was missing or non-numeric
    pub skipped_rows: usize,
}

impl CsvColumns {
    /// Read the first `count` columns of a CSV file
    pub fn read(path: impl AsRef<Path>, count: usize) -> InputResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path).map_err(|e| InputError::ReadFailed(e.to_string()))?;
        Self::from_reader(BufReader::new(file), b',', count)
    }

    /// Read the first `count` columns from any reader
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, count: usize) -> InputResult<Self> {
        if count == 0 {
            return Err(InputError::OutOfRange {
                name: "columns".to_string(),
                reason: "at least one column must be requested".to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut result = CsvColumns {
            headers: None,
            columns: vec![Vec::new(); count],
            skipped_rows: 0,
        };

        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| InputError::Csv(e.to_string()))?;

            match numeric_cells(&record, count) {
                Some(values) => {
                    for (column, value) in result.columns.iter_mut().zip(values) {
                        column.push(value);
                    }
                }
                None if index == 0 => {
                    result.headers = Some(
                        record
                            .iter()
                            .take(count)
                            .map(str::to_string)
                            .collect(),
                    );
                }
                None => result.skipped_rows += 1,
            }
        }

        if result.skipped_rows > 0 {
            tracing::warn!(
                skipped = result.skipped_rows,
                "skipped CSV rows without numeric data"
            );
        }

        if result.len() == 0 {
            return Err(InputError::Empty("CSV numeric columns".to_string()));
        }

        Ok(result)
    }

    /// Number of rows read
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take the first column
    pub fn into_single(mut self) -> Vec<f64> {
        self.columns.swap_remove(0)
    }

    /// Take the first two columns as (x, y)
    pub fn into_pair(self) -> InputResult<(Vec<f64>, Vec<f64>)> {
        let mut columns = self.columns.into_iter();
        match (columns.next(), columns.next()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(InputError::TooFewValues {
                label: "CSV columns".to_string(),
                min: 2,
                found: 1,
            }),
        }
    }
}

fn numeric_cells(record: &csv::StringRecord, count: usize) -> Option<Vec<f64>> {
    if record.len() < count {
        return None;
    }
    record
        .iter()
        .take(count)
        .map(|cell| cell.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect()
}
