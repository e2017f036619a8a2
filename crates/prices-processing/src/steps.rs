//! Pipeline steps addressed by strategy name.
//!
//! Each step maps a name to a strategy, runs it through its context and
//! returns the result. Unknown names are configuration errors.

use crate::error::{PreprocessingError, Result};
use crate::features::{
    FeatureEngineer, LogTransformation, MinMaxScaling, OneHotEncoding, StandardScaling,
};
use crate::missing::{
    Axis, DropMissingValuesStrategy, FillMethod, FillMissingValuesStrategy, FillValue,
    MissingValueHandler,
};
use crate::outliers::{OutlierDetectionMethod, OutlierHandling};
use crate::splitter::{DataSplitter, SimpleTrainTestSplitStrategy, SplitData};
use crate::utils::{numeric_column_names, require_column};
use polars::prelude::*;
use tracing::info;

pub use crate::ingest::data_ingestion_step;

/// Names accepted by [`handle_missing_values_step`].
pub const MISSING_VALUE_STRATEGIES: [&str; 5] = ["drop", "mean", "median", "mode", "constant"];

/// Names accepted by [`feature_engineering_step`].
pub const FEATURE_STRATEGIES: [&str; 4] =
    ["log", "standard_scaling", "minmax_scaling", "onehot_encoding"];

fn unsupported(kind: &str, name: &str, supported: &[&str]) -> PreprocessingError {
    PreprocessingError::InvalidConfig(format!(
        "unsupported {kind} strategy '{name}' (expected one of: {})",
        supported.join(", ")
    ))
}

/// Handle missing values with the named strategy.
///
/// `fill_value` is only used by `"constant"`.
pub fn handle_missing_values_step(
    df: &DataFrame,
    strategy: &str,
    fill_value: Option<FillValue>,
) -> Result<DataFrame> {
    info!("Started handling missing values with strategy '{}'", strategy);
    let handler = match strategy {
        "drop" => MissingValueHandler::new(DropMissingValuesStrategy::new(Axis::Rows, None)),
        "mean" | "median" | "mode" | "constant" => {
            let mut fill = FillMissingValuesStrategy::new(FillMethod::parse(strategy));
            if let Some(value) = fill_value {
                fill = fill.with_fill_value(value);
            }
            MissingValueHandler::new(fill)
        }
        other => return Err(unsupported("missing value handling", other, &MISSING_VALUE_STRATEGIES)),
    };

    let cleaned = handler.handle_missing_values(df)?;
    info!("Completed handling missing values");
    Ok(cleaned)
}

/// Apply the named feature engineering strategy to `features`.
pub fn feature_engineering_step(
    df: &DataFrame,
    strategy: &str,
    features: &[String],
) -> Result<DataFrame> {
    info!("Started feature engineering with strategy '{}'", strategy);
    let features = features.to_vec();
    let engineer = match strategy {
        "log" => FeatureEngineer::new(LogTransformation::new(features)),
        "standard_scaling" => FeatureEngineer::new(StandardScaling::new(features)),
        "minmax_scaling" => FeatureEngineer::new(MinMaxScaling::new(features)),
        "onehot_encoding" => FeatureEngineer::new(OneHotEncoding::new(features)),
        other => return Err(unsupported("feature engineering", other, &FEATURE_STRATEGIES)),
    };

    let transformed = engineer.apply_feature_engineering(df)?;
    info!("Completed feature engineering");
    Ok(transformed)
}

/// Detect and handle outliers over the numeric columns of `df`.
///
/// `column_name` must exist. Non-numeric columns are dropped from the result.
pub fn outlier_detection_step(
    df: &DataFrame,
    column_name: &str,
    detection: OutlierDetectionMethod,
    zscore_threshold: f64,
    handling: OutlierHandling,
) -> Result<DataFrame> {
    info!(
        "Started outlier detection around '{}' ({}, {})",
        column_name, detection, handling
    );
    require_column(df, column_name)?;

    let numeric = df.select(numeric_column_names(df))?;
    let detector = detection.detector(zscore_threshold);
    let cleaned = detector.handle_outliers(&numeric, handling)?;

    info!(
        "Completed outlier detection: {} -> {} rows",
        df.height(),
        cleaned.height()
    );
    Ok(cleaned)
}

/// Split `df` into train and test features and target.
pub fn data_splitter_step(
    df: &DataFrame,
    target_column: &str,
    test_size: f64,
    random_state: u64,
) -> Result<SplitData> {
    info!("Started data splitting on target '{}'", target_column);
    let splitter = DataSplitter::new(SimpleTrainTestSplitStrategy::new(test_size, random_state));
    let split = splitter.split(df, target_column)?;
    info!("Completed data splitting");
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::column_names;
    use pretty_assertions::assert_eq;

    fn houses() -> DataFrame {
        df![
            "SalePrice" => [Some(100.0), Some(150.0), None, Some(250.0)],
            "Gr Liv Area" => [Some(800.0), None, Some(1200.0), Some(1500.0)],
            "Neighborhood" => ["NAmes", "CollgCr", "NAmes", "OldTown"],
        ]
        .unwrap()
    }

    #[test]
    fn test_missing_values_step_mean() {
        let filled = handle_missing_values_step(&houses(), "mean", None).unwrap();
        assert_eq!(filled.shape(), (4, 3));
        assert_eq!(filled.column("SalePrice").unwrap().null_count(), 0);
        assert_eq!(filled.column("Gr Liv Area").unwrap().null_count(), 0);
    }

    #[test]
    fn test_missing_values_step_drop() {
        let cleaned = handle_missing_values_step(&houses(), "drop", None).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn test_missing_values_step_constant() {
        let filled =
            handle_missing_values_step(&houses(), "constant", Some(FillValue::Number(0.0))).unwrap();
        assert_eq!(filled.column("SalePrice").unwrap().null_count(), 0);

        let err = handle_missing_values_step(&houses(), "constant", None).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_missing_values_step_unknown() {
        let err = handle_missing_values_step(&houses(), "interpolate", None).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("interpolate"));
    }

    #[test]
    fn test_feature_engineering_step() {
        let filled = handle_missing_values_step(&houses(), "mean", None).unwrap();
        let features = vec!["SalePrice".to_string(), "Gr Liv Area".to_string()];
        let logged = feature_engineering_step(&filled, "log", &features).unwrap();

        let first = logged
            .column("SalePrice")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0)
            .unwrap();
        assert!((first - 101.0f64.ln()).abs() < 1e-12);

        let encoded =
            feature_engineering_step(&filled, "onehot_encoding", &["Neighborhood".to_string()])
                .unwrap();
        assert_eq!(
            column_names(&encoded),
            vec![
                "Neighborhood_CollgCr",
                "Neighborhood_NAmes",
                "Neighborhood_OldTown",
                "SalePrice",
                "Gr Liv Area"
            ]
        );
    }

    #[test]
    fn test_feature_engineering_step_unknown() {
        let err = feature_engineering_step(&houses(), "pca", &[]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_outlier_step_keeps_numeric_columns() {
        let filled = handle_missing_values_step(&houses(), "mean", None).unwrap();
        let cleaned = outlier_detection_step(
            &filled,
            "SalePrice",
            OutlierDetectionMethod::Zscore,
            3.0,
            OutlierHandling::Remove,
        )
        .unwrap();
        assert_eq!(column_names(&cleaned), vec!["SalePrice", "Gr Liv Area"]);
        assert_eq!(cleaned.height(), 4);
    }

    #[test]
    fn test_outlier_step_requires_column() {
        let err = outlier_detection_step(
            &houses(),
            "Lot Area",
            OutlierDetectionMethod::Iqr,
            3.0,
            OutlierHandling::Cap,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_data_splitter_step() {
        let filled = handle_missing_values_step(&houses(), "mean", None).unwrap();
        let split = data_splitter_step(&filled, "SalePrice", 0.25, 42).unwrap();
        assert_eq!(split.x_test.height(), 1);
        assert_eq!(split.x_train.height(), 3);
        assert!(split.x_train.column("SalePrice").is_err());
    }
}
