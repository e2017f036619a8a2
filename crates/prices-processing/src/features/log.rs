//! Logarithmic transformation.

use super::{FeatureEngineeringStrategy, feature_list};
use crate::error::{PreprocessingError, Result};
use crate::utils::{numeric_values, replace_columns, require_columns, require_numeric_column};
use polars::prelude::*;
use tracing::info;

/// Replaces each feature with `ln(1 + x)`.
///
/// Values must be greater than -1. A value at or below -1 is reported as a
/// [`PreprocessingError::DomainError`] instead of producing NaN or -inf.
/// Nulls stay null.
#[derive(Debug, Clone)]
pub struct LogTransformation {
    features: Vec<String>,
}

impl LogTransformation {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: feature_list(features),
        }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }
}

impl FeatureEngineeringStrategy for LogTransformation {
    fn apply_transformation(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Applying log transformation to features: {:?}", self.features);
        require_columns(df, &self.features)?;

        let mut replacements = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            let series = require_numeric_column(df, feature)?;
            let transformed = numeric_values(series)?
                .into_iter()
                .map(|value| match value {
                    Some(x) if x <= -1.0 => Err(PreprocessingError::DomainError {
                        column: feature.clone(),
                        value: x,
                        transform: "log1p".to_string(),
                    }),
                    Some(x) => Ok(Some(x.ln_1p())),
                    None => Ok(None),
                })
                .collect::<Result<Vec<Option<f64>>>>()?;
            replacements.push(Series::new(feature.as_str().into(), transformed));
        }

        let transformed = replace_columns(df, replacements)?;
        info!("Log transformation completed");
        Ok(transformed)
    }
}

/// Undo [`LogTransformation`] on the given features (`exp(x) - 1`).
pub fn inverse_log_transform(df: &DataFrame, features: &[String]) -> Result<DataFrame> {
    require_columns(df, features)?;

    let mut replacements = Vec::with_capacity(features.len());
    for feature in features {
        let series = require_numeric_column(df, feature)?;
        let restored: Vec<Option<f64>> = numeric_values(series)?
            .into_iter()
            .map(|value| value.map(f64::exp_m1))
            .collect();
        replacements.push(Series::new(feature.as_str().into(), restored));
    }

    Ok(replace_columns(df, replacements)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_transform_values() {
        let df = df![
            "price" => [0.0, 1.0, std::f64::consts::E - 1.0],
            "zone" => ["A", "B", "C"],
        ]
        .unwrap();

        let transformed = LogTransformation::new(["price"])
            .apply_transformation(&df)
            .unwrap();

        let values = numeric_values(transformed.column("price").unwrap().as_materialized_series())
            .unwrap();
        assert_eq!(values[0], Some(0.0));
        assert!((values[1].unwrap() - 2.0f64.ln()).abs() < 1e-12);
        assert!((values[2].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(transformed.column("zone").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_log_round_trip() {
        let original = vec![0.0, 0.5, 12.0, 180_000.0, 1e-9];
        let df = df!["price" => original.clone()].unwrap();
        let features = vec!["price".to_string()];

        let transformed = LogTransformation::new(features.clone())
            .apply_transformation(&df)
            .unwrap();
        let restored = inverse_log_transform(&transformed, &features).unwrap();

        let values = numeric_values(restored.column("price").unwrap().as_materialized_series())
            .unwrap();
        for (restored, original) in values.iter().zip(original.iter()) {
            let restored = restored.unwrap();
            assert!((restored - original).abs() <= 1e-9 * original.abs().max(1.0));
        }
    }

    #[test]
    fn test_log_transform_keeps_nulls() {
        let df = df!["area" => [Some(1.0), None]].unwrap();
        let transformed = LogTransformation::new(["area"])
            .apply_transformation(&df)
            .unwrap();
        assert_eq!(transformed.column("area").unwrap().null_count(), 1);
    }

    #[test]
    fn test_log_transform_domain_error() {
        let df = df!["delta" => [1.0, -1.0, 2.0]].unwrap();
        let err = LogTransformation::new(["delta"])
            .apply_transformation(&df)
            .unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::DomainError { ref column, value, .. } if column == "delta" && value == -1.0
        ));
    }

    #[test]
    fn test_log_transform_missing_feature() {
        let df = df!["price" => [1.0]].unwrap();
        let err = LogTransformation::new(["price", "area"])
            .apply_transformation(&df)
            .unwrap_err();
        assert!(matches!(err, PreprocessingError::ColumnNotFound(name) if name == "area"));
    }

    #[test]
    fn test_log_transform_rejects_text() {
        let df = df!["zone" => ["A"]].unwrap();
        let err = LogTransformation::new(["zone"])
            .apply_transformation(&df)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_COLUMN_TYPE");
    }
}
