//! Custom error types for the preprocessing strategies and pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Errors fall
//! into three categories (see [`ErrorCategory`]): configuration errors raised
//! before any data is touched, data errors raised while transforming a
//! dataset, and I/O errors from ingestion and report writing.
//!
//! Errors are serializable so they can be embedded in JSON run reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for preprocessing operations.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided (unknown strategy name, bad parameter).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Column has a dtype the operation cannot work with.
    #[error("Column '{column}' has type {actual}, expected {expected}")]
    InvalidColumnType {
        column: String,
        expected: String,
        actual: String,
    },

    /// A value fell outside the mathematical domain of a transform.
    #[error("Value {value} in column '{column}' is outside the domain of {transform}")]
    DomainError {
        column: String,
        value: f64,
        transform: String,
    },

    /// Input file does not have a supported extension.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Archive extraction produced no CSV file.
    #[error("No CSV file found in '{}'", .0.display())]
    NoCsvFound(PathBuf),

    /// Archive extraction produced more than one CSV file.
    #[error("Multiple CSV files found ({}); please specify which one to use", .0.join(", "))]
    MultipleCsvFound(Vec<String>),

    /// Zip archive could not be read.
    #[error("Archive error: {0}")]
    Archive(#[from] ::zip::result::ZipError),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

/// Coarse classification of a [`PreprocessingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad strategy name, missing target, wrong file type, bad parameter.
    Configuration,
    /// The dataset itself cannot be processed as requested.
    Data,
    /// Filesystem, archive or serialization failure.
    Io,
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidColumnType { .. } => "INVALID_COLUMN_TYPE",
            Self::DomainError { .. } => "DOMAIN_ERROR",
            Self::UnsupportedFileType(_) => "UNSUPPORTED_FILE_TYPE",
            Self::NoCsvFound(_) => "NO_CSV_FOUND",
            Self::MultipleCsvFound(_) => "MULTIPLE_CSV_FOUND",
            Self::Archive(_) => "ARCHIVE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig(_)
            | Self::UnsupportedFileType(_)
            | Self::MultipleCsvFound(_) => ErrorCategory::Configuration,
            Self::ColumnNotFound(_)
            | Self::NoValidValues(_)
            | Self::InvalidColumnType { .. }
            | Self::DomainError { .. }
            | Self::NoCsvFound(_)
            | Self::Polars(_) => ErrorCategory::Data,
            Self::Archive(_) | Self::Io(_) | Self::Json(_) => ErrorCategory::Io,
            Self::WithContext { source, .. } => source.category(),
        }
    }

    /// Check if this error was caused by configuration rather than data.
    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Io(e).with_context(context))
    }
}
