//! Spreadsheet files forwarded to the statistics service
//!
//! The service locates the numeric data itself (first column for
//! descriptive statistics, first two for regression), so the file is sent
//! as-is in a multipart form.

use std::path::Path;

use crate::error::{InputError, InputResult};

/// Spreadsheet formats the service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Csv,
    Xls,
    Xlsx,
}

impl UploadFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> InputResult<Self> {
        match extension.to_lowercase().as_str() {
            "csv" => Ok(UploadFormat::Csv),
            "xls" => Ok(UploadFormat::Xls),
            "xlsx" => Ok(UploadFormat::Xlsx),
            other => Err(InputError::UnsupportedFile {
                extension: other.to_string(),
            }),
        }
    }

    /// MIME type sent with the multipart part
    pub fn mime_type(&self) -> &'static str {
        match self {
            UploadFormat::Csv => "text/csv",
            UploadFormat::Xls => "application/vnd.ms-excel",
            UploadFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            UploadFormat::Csv => "csv",
            UploadFormat::Xls => "xls",
            UploadFormat::Xlsx => "xlsx",
        }
    }
}

/// A file read into memory, ready to be attached to a request
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub format: UploadFormat,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read a spreadsheet from disk
    pub fn open(path: impl AsRef<Path>) -> InputResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let format = UploadFormat::from_extension(extension)?;

        if !path.exists() {
            return Err(InputError::FileNotFound(display));
        }

        let bytes = std::fs::read(path).map_err(|e| InputError::ReadFailed(e.to_string()))?;
        if bytes.is_empty() {
            return Err(InputError::Empty(display));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload.{}", format.extension()));

        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    /// Build from bytes already in memory
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> InputResult<Self> {
        let file_name = file_name.into();
        let extension = file_name.rsplit('.').next().unwrap_or_default();
        let format = UploadFormat::from_extension(extension)?;
        if bytes.is_empty() {
            return Err(InputError::Empty(file_name));
        }
        Ok(Self {
            file_name,
            format,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// List supported upload extensions
pub fn supported_extensions() -> Vec<&'static str> {
    vec!["csv", "xls", "xlsx"]
}
