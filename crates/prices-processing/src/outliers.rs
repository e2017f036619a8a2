//! Outlier detection and handling.
//!
//! Detection strategies return a Boolean mask with the same shape and column
//! names as the input, `true` marking an outlier. Nulls are never outliers.
//! The [`OutlierDetector`] context turns a mask into a handled frame.

use crate::analysis::render;
use crate::error::{PreprocessingError, Result};
use crate::stats::{self, FiveNumberSummary};
use crate::utils::{non_null_numeric_values, numeric_values, require_columns, require_numeric_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use tracing::{debug, info};

/// Contract for outlier detection strategies.
pub trait OutlierDetectionStrategy: Send + Sync {
    /// Return a Boolean mask of `df`, `true` where a value is an outlier.
    fn detect_outliers(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Flags values whose absolute z-score exceeds a threshold.
///
/// Uses the sample standard deviation. A constant column flags nothing.
#[derive(Debug, Clone)]
pub struct ZScoreOutlierDetection {
    threshold: f64,
}

impl ZScoreOutlierDetection {
    pub const DEFAULT_THRESHOLD: f64 = 3.0;

    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ZScoreOutlierDetection {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}

impl OutlierDetectionStrategy for ZScoreOutlierDetection {
    fn detect_outliers(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Detecting outliers using the Z-score method.");
        let threshold = self.threshold;

        let mask = build_mask(df, |ca| {
            let bounds = ca.mean().zip(ca.std(1));
            Ok(ca
                .iter()
                .map(|value| match (value, bounds) {
                    (Some(x), Some((mean, std))) if std > 0.0 => {
                        ((x - mean) / std).abs() > threshold
                    }
                    _ => false,
                })
                .collect())
        })?;

        info!("Outliers detected with Z-score threshold: {}.", threshold);
        Ok(mask)
    }
}

/// Flags values outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
#[derive(Debug, Clone, Default)]
pub struct IqrOutlierDetection;

impl OutlierDetectionStrategy for IqrOutlierDetection {
    fn detect_outliers(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Detecting outliers using the IQR method.");

        let mask = build_mask(df, |ca| {
            let fences = FiveNumberSummary::from_chunked(ca)?.map(|s| s.fences());
            Ok(ca
                .iter()
                .map(|value| match (value, fences) {
                    (Some(x), Some((lower, upper))) => x < lower || x > upper,
                    _ => false,
                })
                .collect())
        })?;

        info!("Outliers detected using the IQR method.");
        Ok(mask)
    }
}

/// Apply `flag` to every column of `df`. Every column must be numeric.
fn build_mask<F>(df: &DataFrame, flag: F) -> Result<DataFrame>
where
    F: Fn(&Float64Chunked) -> PolarsResult<Vec<bool>>,
{
    let mut columns = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let series = require_numeric_column(df, col.name())?;
        let flags = flag(&stats::float_chunked(series)?)?;
        debug!(
            "'{}': {} outliers",
            col.name(),
            flags.iter().filter(|&&f| f).count()
        );
        columns.push(Series::new(col.name().clone(), flags).into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Which detection strategy to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierDetectionMethod {
    #[default]
    Zscore,
    Iqr,
}

impl OutlierDetectionMethod {
    /// Build a detector for this method. `zscore_threshold` is ignored by IQR.
    pub fn detector(self, zscore_threshold: f64) -> OutlierDetector {
        match self {
            Self::Zscore => OutlierDetector::new(ZScoreOutlierDetection::new(zscore_threshold)),
            Self::Iqr => OutlierDetector::new(IqrOutlierDetection),
        }
    }
}

impl FromStr for OutlierDetectionMethod {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zscore" | "z_score" => Ok(Self::Zscore),
            "iqr" => Ok(Self::Iqr),
            other => Err(PreprocessingError::InvalidConfig(format!(
                "unknown outlier detection method '{other}', expected 'zscore' or 'iqr'"
            ))),
        }
    }
}

impl fmt::Display for OutlierDetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zscore => write!(f, "zscore"),
            Self::Iqr => write!(f, "iqr"),
        }
    }
}

/// What to do with detected outliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierHandling {
    /// Drop every row flagged in any column
    #[default]
    Remove,
    /// Clip every column to its 1st and 99th percentiles
    Cap,
}

impl FromStr for OutlierHandling {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "cap" => Ok(Self::Cap),
            other => Err(PreprocessingError::InvalidConfig(format!(
                "unknown outlier handling method '{other}', expected 'remove' or 'cap'"
            ))),
        }
    }
}

impl fmt::Display for OutlierHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => write!(f, "remove"),
            Self::Cap => write!(f, "cap"),
        }
    }
}

/// Context holding the active outlier detection strategy.
pub struct OutlierDetector {
    strategy: Box<dyn OutlierDetectionStrategy>,
}

static_assertions::assert_impl_all!(OutlierDetector: Send, Sync);

impl OutlierDetector {
    pub fn new(strategy: impl OutlierDetectionStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Replace the active strategy.
    pub fn set_strategy(&mut self, strategy: impl OutlierDetectionStrategy + 'static) {
        info!("Switching outlier detection strategy.");
        self.strategy = Box::new(strategy);
    }

    pub fn detect_outliers(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Executing outlier detection strategy.");
        self.strategy.detect_outliers(df)
    }

    /// Detect outliers with the active strategy, then remove or cap them.
    pub fn handle_outliers(&self, df: &DataFrame, method: OutlierHandling) -> Result<DataFrame> {
        let mask = self.detect_outliers(df)?;
        info!("Handling outliers using the {} method.", method);

        let handled = match method {
            OutlierHandling::Remove => remove_flagged_rows(df, &mask)?,
            OutlierHandling::Cap => cap_to_percentiles(df)?,
        };

        info!("Outlier handling completed.");
        debug!("Shape {:?} -> {:?}", df.shape(), handled.shape());
        Ok(handled)
    }

    /// Write a box-plot summary for each feature to `out`.
    pub fn visualize_outliers(
        &self,
        df: &DataFrame,
        features: &[String],
        out: &mut dyn Write,
    ) -> Result<()> {
        info!("Visualizing outliers for features: {:?}", features);
        require_columns(df, features)?;

        for feature in features {
            let series = require_numeric_column(df, feature)?;
            let values = non_null_numeric_values(series)?;
            writeln!(out, "Boxplot of {feature}")?;
            match FiveNumberSummary::from_series(series)? {
                Some(summary) => {
                    render::box_plot(out, &summary, &values)?;
                }
                None => writeln!(out, "  (no values)")?,
            }
            writeln!(out)?;
        }

        info!("Outlier visualization completed.");
        Ok(())
    }
}

fn remove_flagged_rows(df: &DataFrame, mask: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for col in mask.get_columns() {
        for (idx, flagged) in col.as_materialized_series().bool()?.into_iter().enumerate() {
            if flagged.unwrap_or(false) {
                keep[idx] = false;
            }
        }
    }

    let keep = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&keep)?)
}

fn cap_to_percentiles(df: &DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(df.width());
    for col in df.get_columns() {
        let series = require_numeric_column(df, col.name())?;
        let values = numeric_values(series)?;

        let capped: Vec<Option<f64>> = match (
            stats::quantile(series, 0.01)?,
            stats::quantile(series, 0.99)?,
        ) {
            (Some(lower), Some(upper)) => values
                .into_iter()
                .map(|v| v.map(|x| x.clamp(lower, upper)))
                .collect(),
            _ => values,
        };
        columns.push(Series::new(col.name().clone(), capped).into());
    }
    Ok(DataFrame::new(columns)?)
}
