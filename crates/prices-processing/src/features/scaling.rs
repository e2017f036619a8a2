//! Standard and min-max feature scaling.
//!
//! [`StandardScaling`] and [`MinMaxScaling`] fit their statistics on the frame
//! they are applied to, every time. To apply training statistics to another
//! frame, call `fit` once and keep the returned [`FittedScaler`].

use super::{FeatureEngineeringStrategy, feature_list};
use crate::error::{PreprocessingError, Result};
use crate::stats;
use crate::utils::{numeric_values, replace_columns, require_columns, require_numeric_column};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Type of scaler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    /// (x - mean) / std, population std
    Standard,
    /// (x - min) / (max - min)
    MinMax,
}

/// Fitted parameters for one column: `scaled = (x - center) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnScale {
    pub column: String,
    pub center: f64,
    pub scale: f64,
}

/// Scaler statistics fit on one DataFrame, reusable on others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    kind: ScalerKind,
    columns: Vec<ColumnScale>,
}

impl FittedScaler {
    /// Fit scaling parameters for `features` on `df`.
    ///
    /// A constant column gets a scale of 1 so it maps to zero instead of NaN.
    pub fn fit(kind: ScalerKind, df: &DataFrame, features: &[String]) -> Result<Self> {
        require_columns(df, features)?;

        let mut columns = Vec::with_capacity(features.len());
        for feature in features {
            let ca = stats::float_chunked(require_numeric_column(df, feature)?)?;
            let (center, spread) = match kind {
                ScalerKind::Standard => (ca.mean(), ca.std(0)),
                ScalerKind::MinMax => {
                    let (min, max) = (ca.min(), ca.max());
                    (min, min.zip(max).map(|(min, max)| max - min))
                }
            };

            let (center, spread) = center
                .zip(spread)
                .ok_or_else(|| PreprocessingError::NoValidValues(feature.clone()))?;
            let scale = if spread == 0.0 { 1.0 } else { spread };

            debug!("Fitted {:?} scaler on '{}': center={}, scale={}", kind, feature, center, scale);
            columns.push(ColumnScale {
                column: feature.clone(),
                center,
                scale,
            });
        }

        Ok(Self { kind, columns })
    }

    pub fn kind(&self) -> ScalerKind {
        self.kind
    }

    pub fn columns(&self) -> &[ColumnScale] {
        &self.columns
    }

    /// Scale the fitted columns of `df`.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.map_columns(df, |x, params| (x - params.center) / params.scale)
    }

    /// Undo [`transform`](Self::transform).
    pub fn inverse_transform(&self, df: &DataFrame) -> Result<DataFrame> {
        self.map_columns(df, |x, params| x * params.scale + params.center)
    }

    fn map_columns<F>(&self, df: &DataFrame, f: F) -> Result<DataFrame>
    where
        F: Fn(f64, &ColumnScale) -> f64,
    {
        let mut replacements = Vec::with_capacity(self.columns.len());
        for params in &self.columns {
            let series = require_numeric_column(df, &params.column)?;
            let mapped: Vec<Option<f64>> = numeric_values(series)?
                .into_iter()
                .map(|value| value.map(|x| f(x, params)))
                .collect();
            replacements.push(Series::new(params.column.as_str().into(), mapped));
        }
        Ok(replace_columns(df, replacements)?)
    }
}

/// Standardizes features to zero mean and unit variance.
#[derive(Debug, Clone)]
pub struct StandardScaling {
    features: Vec<String>,
}

impl StandardScaling {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: feature_list(features),
        }
    }

    /// Fit once and keep the statistics.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedScaler> {
        FittedScaler::fit(ScalerKind::Standard, df, &self.features)
    }
}

impl FeatureEngineeringStrategy for StandardScaling {
    fn apply_transformation(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Applying standard scaling to features: {:?}", self.features);
        let scaled = self.fit(df)?.transform(df)?;
        info!("Standard scaling completed");
        Ok(scaled)
    }
}

/// Rescales features into `[0, 1]`.
#[derive(Debug, Clone)]
pub struct MinMaxScaling {
    features: Vec<String>,
}

impl MinMaxScaling {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: feature_list(features),
        }
    }

    /// Fit once and keep the statistics.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedScaler> {
        FittedScaler::fit(ScalerKind::MinMax, df, &self.features)
    }
}

impl FeatureEngineeringStrategy for MinMaxScaling {
    fn apply_transformation(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Applying min-max scaling to features: {:?}", self.features);
        let scaled = self.fit(df)?.transform(df)?;
        info!("Min-max scaling completed");
        Ok(scaled)
    }
}
