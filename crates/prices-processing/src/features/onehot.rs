//! One-hot encoding of categorical features.

use super::{FeatureEngineeringStrategy, feature_list};
use crate::error::Result;
use crate::utils::{require_column, require_columns, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};

/// Replaces each feature with one `Boolean` column per category.
///
/// Encoded columns are named `{feature}_{category}` and come first, followed
/// by the remaining original columns in their original order.
#[derive(Debug, Clone)]
pub struct OneHotEncoding {
    features: Vec<String>,
}

impl OneHotEncoding {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: feature_list(features),
        }
    }

    /// Record the categories observed in `df`.
    pub fn fit(&self, df: &DataFrame) -> Result<FittedEncoder> {
        FittedEncoder::fit(df, &self.features)
    }
}

impl FeatureEngineeringStrategy for OneHotEncoding {
    fn apply_transformation(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Applying one-hot encoding to features: {:?}", self.features);
        let encoded = self.fit(df)?.transform(df)?;
        info!("One-hot encoding completed");
        Ok(encoded)
    }
}

/// Per-feature category lists, sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedEncoder {
    categories: Vec<(String, Vec<String>)>,
}

impl FittedEncoder {
    pub fn fit(df: &DataFrame, features: &[String]) -> Result<Self> {
        require_columns(df, features)?;

        let mut categories = Vec::with_capacity(features.len());
        for feature in features {
            let observed: BTreeSet<String> = string_values(require_column(df, feature)?)?
                .into_iter()
                .flatten()
                .collect();
            debug!("'{}' has {} categories", feature, observed.len());
            categories.push((feature.clone(), observed.into_iter().collect()));
        }

        Ok(Self { categories })
    }

    /// Categories recorded for `feature`, if it was fitted.
    pub fn categories(&self, feature: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, cats)| cats.as_slice())
    }

    /// Names of the columns [`transform`](Self::transform) produces.
    pub fn encoded_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(feature, cats)| cats.iter().map(move |cat| format!("{feature}_{cat}")))
            .collect()
    }

    /// Encode `df` with the fitted categories.
    ///
    /// Values not seen during fitting (and nulls) give an all-false row.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::new();

        for (feature, cats) in &self.categories {
            let values = string_values(require_column(df, feature)?)?;
            for cat in cats {
                let flags: Vec<bool> = values
                    .iter()
                    .map(|value| value.as_deref() == Some(cat.as_str()))
                    .collect();
                columns.push(Series::new(format!("{feature}_{cat}").into(), flags).into());
            }
        }

        let encoded: HashSet<&str> = self
            .categories
            .iter()
            .map(|(feature, _)| feature.as_str())
            .collect();
        columns.extend(
            df.get_columns()
                .iter()
                .filter(|col| !encoded.contains(col.name().as_str()))
                .cloned(),
        );

        Ok(DataFrame::new(columns)?)
    }
}
