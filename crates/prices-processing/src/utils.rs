//! Shared utilities for the preprocessing strategies.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for preprocessing purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date or datetime types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if matches!(dtype, DataType::Boolean) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

/// Names of the numeric columns of a DataFrame, in frame order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// All column names of a DataFrame as owned strings.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Column Lookup
// =============================================================================

/// Look up a column, mapping a miss to [`PreprocessingError::ColumnNotFound`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|col| col.as_materialized_series())
        .map_err(|_| PreprocessingError::ColumnNotFound(name.to_string()))
}

/// Check that every feature exists before any work is done.
pub fn require_columns(df: &DataFrame, names: &[String]) -> Result<()> {
    for name in names {
        require_column(df, name)?;
    }
    Ok(())
}

/// Look up a column that must be numeric.
pub fn require_numeric_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    let series = require_column(df, name)?;
    if !is_numeric_dtype(series.dtype()) {
        return Err(PreprocessingError::InvalidColumnType {
            column: name.to_string(),
            expected: "numeric".to_string(),
            actual: series.dtype().to_string(),
        });
    }
    Ok(series)
}

// =============================================================================
// Series Extraction Utilities
// =============================================================================

/// Read a numeric Series as `f64` values, keeping nulls as `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series.f64()?.into_iter().collect())
}

/// Read the non-null values of a numeric Series as `f64`.
pub fn non_null_numeric_values(series: &Series) -> PolarsResult<Vec<f64>> {
    Ok(numeric_values(series)?.into_iter().flatten().collect())
}

/// Read a Series as text values, keeping nulls as `None`.
pub fn string_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let str_series = series.cast(&DataType::String)?;
    Ok(str_series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always `Float64`.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let filled: Vec<f64> = numeric_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or(fill_value))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a Series with text, casting the column to `String`.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<String> = string_values(series)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| fill_value.to_string()))
        .collect();

    Ok(Series::new(series.name().clone(), filled))
}

/// Build a DataFrame from columns, replacing those present in `replacements`
/// while keeping the original column order.
pub fn replace_columns(df: &DataFrame, replacements: Vec<Series>) -> PolarsResult<DataFrame> {
    let mut result = df.clone();
    for series in replacements {
        result.with_column(series)?;
    }
    Ok(result)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int64), DtypeCategory::Numeric);
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Datetime);
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Boolean
        );
        assert_eq!(get_dtype_category(&DataType::String), DtypeCategory::String);
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df![
            "price" => [1.0, 2.0],
            "zone" => ["A", "B"],
            "rooms" => [3i64, 4],
        ]
        .unwrap();

        assert_eq!(numeric_column_names(&df), vec!["price", "rooms"]);
    }

    #[test]
    fn test_require_column_missing() {
        let df = df!["price" => [1.0]].unwrap();
        let err = require_column(&df, "area").unwrap_err();
        assert!(matches!(err, PreprocessingError::ColumnNotFound(name) if name == "area"));
    }

    #[test]
    fn test_require_numeric_column_rejects_text() {
        let df = df!["zone" => ["A"]].unwrap();
        let err = require_numeric_column(&df, "zone").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_COLUMN_TYPE");
    }

    #[test]
    fn test_fill_numeric_nulls() {
        let series = Series::new("test".into(), &[Some(1.0), None, Some(3.0)]);
        let filled = fill_numeric_nulls(&series, 0.0).unwrap();

        assert_eq!(filled.null_count(), 0);
        assert_eq!(filled.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
        assert_eq!(filled.get(2).unwrap().try_extract::<f64>().unwrap(), 3.0);
    }

    #[test]
    fn test_fill_numeric_nulls_upcasts_integers() {
        let series = Series::new("rooms".into(), &[Some(1i64), None]);
        let filled = fill_numeric_nulls(&series, 2.5).unwrap();
        assert_eq!(filled.dtype(), &DataType::Float64);
    }

    #[test]
    fn test_fill_string_nulls() {
        let series = Series::new("zone".into(), &[Some("A"), None]);
        let filled = fill_string_nulls(&series, "Unknown").unwrap();
        assert_eq!(
            string_values(&filled).unwrap(),
            vec![Some("A".to_string()), Some("Unknown".to_string())]
        );
    }

    #[test]
    fn test_replace_columns_keeps_order() {
        let df = df![
            "a" => [1.0, 2.0],
            "b" => [3.0, 4.0],
        ]
        .unwrap();
        let replaced =
            replace_columns(&df, vec![Series::new("a".into(), &[10.0, 20.0])]).unwrap();

        assert_eq!(column_names(&replaced), vec!["a", "b"]);
        assert_eq!(
            non_null_numeric_values(replaced.column("a").unwrap().as_materialized_series())
                .unwrap(),
            vec![10.0, 20.0]
        );
    }
}
