//! Statistical and constant imputation.
//!
//! Provides mean, median, mode and constant fills over a whole DataFrame.

use super::MissingValueHandlingStrategy;
use crate::error::{PreprocessingError, Result};
use crate::utils::{
    fill_numeric_nulls, fill_string_nulls, is_numeric_dtype, non_null_numeric_values,
    replace_columns, string_values,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// How a [`FillMissingValuesStrategy`] computes its fill values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FillMethod {
    /// Column mean; numeric columns only
    #[default]
    Mean,
    /// Column median; numeric columns only
    Median,
    /// Most frequent value; every column
    Mode,
    /// One caller-supplied value; every column
    Constant,
    /// A method name that was not recognized. Filling with it is a no-op.
    Unsupported(String),
}

impl FillMethod {
    /// Parse a method name. Unknown names are kept as [`FillMethod::Unsupported`]
    /// rather than rejected.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "mean" => Self::Mean,
            "median" => Self::Median,
            "mode" => Self::Mode,
            "constant" => Self::Constant,
            _ => Self::Unsupported(name.to_string()),
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "mean"),
            Self::Median => write!(f, "median"),
            Self::Mode => write!(f, "mode"),
            Self::Constant => write!(f, "constant"),
            Self::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Value used by [`FillMethod::Constant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

/// Fills nulls using a statistic or a constant.
///
/// Mean and median only touch numeric columns; other columns keep their
/// nulls. Filled numeric columns come back as `Float64`. Mode fills every
/// column with its smallest most-frequent value. Constant fills every column;
/// text constants turn numeric columns into text columns.
#[derive(Debug, Clone, Default)]
pub struct FillMissingValuesStrategy {
    method: FillMethod,
    fill_value: Option<FillValue>,
}

impl FillMissingValuesStrategy {
    pub fn new(method: FillMethod) -> Self {
        Self {
            method,
            fill_value: None,
        }
    }

    /// Constant fill with the given value.
    pub fn constant(value: FillValue) -> Self {
        Self {
            method: FillMethod::Constant,
            fill_value: Some(value),
        }
    }

    /// Set the value used by [`FillMethod::Constant`].
    pub fn with_fill_value(mut self, value: FillValue) -> Self {
        self.fill_value = Some(value);
        self
    }

    pub fn method(&self) -> &FillMethod {
        &self.method
    }

    fn fill_numeric_statistic(&self, df: &DataFrame, use_median: bool) -> Result<DataFrame> {
        let mut replacements = Vec::new();

        for col in df.get_columns() {
            if col.null_count() == 0 {
                continue;
            }
            let series = col.as_materialized_series();
            if !is_numeric_dtype(series.dtype()) {
                warn!(
                    "Skipping non-numeric column '{}' ({} nulls left unfilled)",
                    series.name(),
                    series.null_count()
                );
                continue;
            }

            let statistic = if use_median {
                series.median()
            } else {
                series.mean()
            };

            match statistic {
                Some(value) => {
                    debug!("Filling '{}' with {}: {:.4}", series.name(), self.method, value);
                    replacements.push(fill_numeric_nulls(series, value)?);
                }
                None => debug!("Column '{}' has no values; leaving nulls", series.name()),
            }
        }

        Ok(replace_columns(df, replacements)?)
    }

    fn fill_mode(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut replacements = Vec::new();

        for col in df.get_columns() {
            if col.null_count() == 0 {
                continue;
            }
            let series = col.as_materialized_series();
            let filled = if is_numeric_dtype(series.dtype()) {
                let mode = numeric_mode(&non_null_numeric_values(series)?)
                    .ok_or_else(|| PreprocessingError::NoValidValues(series.name().to_string()))?;
                debug!("Filling '{}' with mode: {}", series.name(), mode);
                fill_numeric_nulls(series, mode)?
            } else if matches!(series.dtype(), DataType::Boolean) {
                let mode = boolean_mode(series)?
                    .ok_or_else(|| PreprocessingError::NoValidValues(series.name().to_string()))?;
                debug!("Filling '{}' with mode: {}", series.name(), mode);
                let values: Vec<bool> = series
                    .bool()?
                    .into_iter()
                    .map(|v| v.unwrap_or(mode))
                    .collect();
                Series::new(series.name().clone(), values)
            } else {
                let mode = text_mode(series)?
                    .ok_or_else(|| PreprocessingError::NoValidValues(series.name().to_string()))?;
                debug!("Filling '{}' with mode: '{}'", series.name(), mode);
                fill_string_nulls(series, &mode)?
            };
            replacements.push(filled);
        }

        Ok(replace_columns(df, replacements)?)
    }

    fn fill_constant(&self, df: &DataFrame) -> Result<DataFrame> {
        let value = self.fill_value.as_ref().ok_or_else(|| {
            PreprocessingError::InvalidConfig(
                "constant fill requires a fill value".to_string(),
            )
        })?;

        let mut replacements = Vec::new();
        for col in df.get_columns() {
            if col.null_count() == 0 {
                continue;
            }
            let series = col.as_materialized_series();
            let filled = match value {
                FillValue::Number(number) if is_numeric_dtype(series.dtype()) => {
                    fill_numeric_nulls(series, *number)?
                }
                other => fill_string_nulls(series, &other.to_string())?,
            };
            replacements.push(filled);
        }

        Ok(replace_columns(df, replacements)?)
    }
}

impl MissingValueHandlingStrategy for FillMissingValuesStrategy {
    fn handle(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Filling missing values using method={}", self.method);

        let filled = match &self.method {
            FillMethod::Mean => self.fill_numeric_statistic(df, false)?,
            FillMethod::Median => self.fill_numeric_statistic(df, true)?,
            FillMethod::Mode => self.fill_mode(df)?,
            FillMethod::Constant => self.fill_constant(df)?,
            FillMethod::Unsupported(name) => {
                warn!("Unknown method '{}'. No missing values handled.", name);
                return Ok(df.clone());
            }
        };

        info!("Missing values filled.");
        Ok(filled)
    }
}

/// Most frequent value; ties resolve to the smallest value.
fn numeric_mode(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut best: Option<(f64, usize)> = None;
    let mut idx = 0;
    while idx < sorted.len() {
        let value = sorted[idx];
        let run = sorted[idx..].iter().take_while(|v| **v == value).count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        idx += run;
    }
    best.map(|(value, _)| value)
}

/// Most frequent text value; ties resolve to the lexicographically smallest.
fn text_mode(series: &Series) -> PolarsResult<Option<String>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in string_values(series)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(String, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
            best = Some((value, count));
        }
    }
    Ok(best.map(|(value, _)| value))
}

fn boolean_mode(series: &Series) -> PolarsResult<Option<bool>> {
    let (mut falses, mut trues) = (0usize, 0usize);
    for value in series.bool()?.into_iter().flatten() {
        if value {
            trues += 1;
        } else {
            falses += 1;
        }
    }
    Ok(match (falses, trues) {
        (0, 0) => None,
        (f, t) if t > f => Some(true),
        _ => Some(false),
    })
}
