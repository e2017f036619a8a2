//! Feature engineering.
//!
//! Every strategy is parametrized by the list of features it transforms:
//! - [`LogTransformation`]: `ln(1 + x)`
//! - [`StandardScaling`] / [`MinMaxScaling`]: refit on every call, or fit once
//!   into a [`FittedScaler`] and reuse it
//! - [`OneHotEncoding`]: one boolean column per category, or fit once into a
//!   [`FittedEncoder`]

mod log;
mod onehot;
mod scaling;

pub use log::{LogTransformation, inverse_log_transform};
pub use onehot::{FittedEncoder, OneHotEncoding};
pub use scaling::{ColumnScale, FittedScaler, MinMaxScaling, ScalerKind, StandardScaling};

use crate::error::Result;
use polars::prelude::*;
use tracing::info;

/// Contract for strategies that transform selected features.
pub trait FeatureEngineeringStrategy: Send + Sync {
    /// Return a transformed copy of `df`.
    fn apply_transformation(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Context holding the active feature engineering strategy.
pub struct FeatureEngineer {
    strategy: Box<dyn FeatureEngineeringStrategy>,
}

static_assertions::assert_impl_all!(FeatureEngineer: Send, Sync);

impl FeatureEngineer {
    pub fn new(strategy: impl FeatureEngineeringStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Replace the active strategy.
    pub fn set_strategy(&mut self, strategy: impl FeatureEngineeringStrategy + 'static) {
        info!("Switching feature engineering strategy.");
        self.strategy = Box::new(strategy);
    }

    /// Apply the active strategy to `df`.
    pub fn apply_feature_engineering(&self, df: &DataFrame) -> Result<DataFrame> {
        self.strategy.apply_transformation(df)
    }
}

/// Collect feature names from anything string-like.
pub(crate) fn feature_list<I, S>(features: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    features.into_iter().map(Into::into).collect()
}
