//! Configuration types for the training-data pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup. Configurations can also be
//! loaded from JSON; missing fields take their defaults.

use crate::ingest::DEFAULT_EXTRACT_DIR;
use crate::missing::FillValue;
use crate::outliers::{OutlierDetectionMethod, OutlierHandling, ZScoreOutlierDetection};
use crate::splitter::SimpleTrainTestSplitStrategy;
use crate::steps::{FEATURE_STRATEGIES, MISSING_VALUE_STRATEGIES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the training-data pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use prices_processing::config::PipelineConfig;
/// use prices_processing::outliers::OutlierHandling;
///
/// let config = PipelineConfig::builder()
///     .missing_strategy("median")
///     .outlier_handling(OutlierHandling::Cap)
///     .test_size(0.25)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory the input archive is extracted into.
    /// Default: "extracted_data"
    pub extract_dir: PathBuf,

    /// Missing-value strategy name: drop, mean, median, mode or constant.
    /// Default: "mean"
    pub missing_strategy: String,

    /// Value used by the "constant" missing-value strategy.
    /// Default: None
    pub fill_value: Option<FillValue>,

    /// Feature engineering strategy name: log, standard_scaling,
    /// minmax_scaling or onehot_encoding.
    /// Default: "log"
    pub feature_strategy: String,

    /// Features the feature engineering strategy applies to.
    /// Default: ["SalePrice", "Gr Liv Area"]
    pub features: Vec<String>,

    /// Column that must be present for outlier detection.
    /// Default: "SalePrice"
    pub outlier_column: String,

    /// Outlier detection method.
    /// Default: Zscore
    pub outlier_detection: OutlierDetectionMethod,

    /// Absolute z-score above which a value is an outlier.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// What to do with detected outliers.
    /// Default: Remove
    pub outlier_handling: OutlierHandling,

    /// Column the model will predict.
    /// Default: "SalePrice"
    pub target_column: String,

    /// Share of rows held out for testing, in (0, 1).
    /// Default: 0.2
    pub test_size: f64,

    /// Seed for the train/test shuffle.
    /// Default: 42
    pub random_state: u64,

    /// Output directory for the run report.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// Whether to write the JSON run report to `output_dir`.
    /// Default: false
    pub save_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract_dir: PathBuf::from(DEFAULT_EXTRACT_DIR),
            missing_strategy: "mean".to_string(),
            fill_value: None,
            feature_strategy: "log".to_string(),
            features: vec!["SalePrice".to_string(), "Gr Liv Area".to_string()],
            outlier_column: "SalePrice".to_string(),
            outlier_detection: OutlierDetectionMethod::default(),
            zscore_threshold: ZScoreOutlierDetection::DEFAULT_THRESHOLD,
            outlier_handling: OutlierHandling::default(),
            target_column: "SalePrice".to_string(),
            test_size: SimpleTrainTestSplitStrategy::DEFAULT_TEST_SIZE,
            random_state: SimpleTrainTestSplitStrategy::DEFAULT_RANDOM_STATE,
            output_dir: PathBuf::from("output"),
            save_report: false,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| crate::error::PreprocessingError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !MISSING_VALUE_STRATEGIES.contains(&self.missing_strategy.as_str()) {
            return Err(ConfigValidationError::UnsupportedStrategy {
                field: "missing_strategy".to_string(),
                value: self.missing_strategy.clone(),
            });
        }

        if self.missing_strategy == "constant" && self.fill_value.is_none() {
            return Err(ConfigValidationError::MissingFillValue);
        }

        if !FEATURE_STRATEGIES.contains(&self.feature_strategy.as_str()) {
            return Err(ConfigValidationError::UnsupportedStrategy {
                field: "feature_strategy".to_string(),
                value: self.feature_strategy.clone(),
            });
        }

        if self.outlier_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("outlier_column".to_string()));
        }

        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyField("target_column".to_string()));
        }

        if !(self.zscore_threshold.is_finite() && self.zscore_threshold > 0.0) {
            return Err(ConfigValidationError::InvalidThreshold(self.zscore_threshold));
        }

        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigValidationError::InvalidTestSize(self.test_size));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Unsupported {field} '{value}'")]
    UnsupportedStrategy { field: String, value: String },

    #[error("The 'constant' missing-value strategy requires a fill_value")]
    MissingFillValue,

    #[error("'{0}' must not be empty")]
    EmptyField(String),

    #[error("Invalid z-score threshold: {0} (must be a positive number)")]
    InvalidThreshold(f64),

    #[error("Invalid test size: {0} (must be between 0.0 and 1.0, exclusive)")]
    InvalidTestSize(f64),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    extract_dir: Option<PathBuf>,
    missing_strategy: Option<String>,
    fill_value: Option<FillValue>,
    feature_strategy: Option<String>,
    features: Option<Vec<String>>,
    outlier_column: Option<String>,
    outlier_detection: Option<OutlierDetectionMethod>,
    zscore_threshold: Option<f64>,
    outlier_handling: Option<OutlierHandling>,
    target_column: Option<String>,
    test_size: Option<f64>,
    random_state: Option<u64>,
    output_dir: Option<PathBuf>,
    save_report: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the directory archives are extracted into.
    pub fn extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = Some(dir.into());
        self
    }

    /// Set the missing-value strategy by name.
    pub fn missing_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.missing_strategy = Some(strategy.into());
        self
    }

    /// Set the value used by the "constant" strategy.
    pub fn fill_value(mut self, value: FillValue) -> Self {
        self.fill_value = Some(value);
        self
    }

    /// Set the feature engineering strategy by name.
    pub fn feature_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.feature_strategy = Some(strategy.into());
        self
    }

    /// Set the features to transform.
    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Some(features.into_iter().map(Into::into).collect());
        self
    }

    pub fn outlier_column(mut self, column: impl Into<String>) -> Self {
        self.outlier_column = Some(column.into());
        self
    }

    pub fn outlier_detection(mut self, method: OutlierDetectionMethod) -> Self {
        self.outlier_detection = Some(method);
        self
    }

    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    pub fn outlier_handling(mut self, handling: OutlierHandling) -> Self {
        self.outlier_handling = Some(handling);
        self
    }

    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the share of rows held out for testing.
    ///
    /// # Arguments
    /// * `test_size` - Value strictly between 0.0 and 1.0 (e.g., 0.2 = 20%)
    pub fn test_size(mut self, test_size: f64) -> Self {
        self.test_size = Some(test_size);
        self
    }

    pub fn random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Set the output directory for the run report.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Write the JSON run report to the output directory.
    pub fn save_report(mut self, save: bool) -> Self {
        self.save_report = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            extract_dir: self.extract_dir.unwrap_or(defaults.extract_dir),
            missing_strategy: self.missing_strategy.unwrap_or(defaults.missing_strategy),
            fill_value: self.fill_value,
            feature_strategy: self.feature_strategy.unwrap_or(defaults.feature_strategy),
            features: self.features.unwrap_or(defaults.features),
            outlier_column: self.outlier_column.unwrap_or(defaults.outlier_column),
            outlier_detection: self.outlier_detection.unwrap_or_default(),
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            outlier_handling: self.outlier_handling.unwrap_or_default(),
            target_column: self.target_column.unwrap_or(defaults.target_column),
            test_size: self.test_size.unwrap_or(defaults.test_size),
            random_state: self.random_state.unwrap_or(defaults.random_state),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            save_report: self.save_report.unwrap_or(defaults.save_report),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.missing_strategy, "mean");
        assert_eq!(config.feature_strategy, "log");
        assert_eq!(config.features, vec!["SalePrice", "Gr Liv Area"]);
        assert_eq!(config.outlier_column, "SalePrice");
        assert_eq!(config.outlier_detection, OutlierDetectionMethod::Zscore);
        assert_eq!(config.outlier_handling, OutlierHandling::Remove);
        assert_eq!(config.target_column, "SalePrice");
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.extract_dir, PathBuf::from("extracted_data"));
        assert!(!config.save_report);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .missing_strategy("median")
            .feature_strategy("minmax_scaling")
            .features(["Lot Area"])
            .outlier_detection(OutlierDetectionMethod::Iqr)
            .outlier_handling(OutlierHandling::Cap)
            .test_size(0.3)
            .random_state(7)
            .save_report(true)
            .build()
            .unwrap();

        assert_eq!(config.missing_strategy, "median");
        assert_eq!(config.features, vec!["Lot Area"]);
        assert_eq!(config.outlier_detection, OutlierDetectionMethod::Iqr);
        assert_eq!(config.outlier_handling, OutlierHandling::Cap);
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.random_state, 7);
        assert!(config.save_report);
    }

    #[test]
    fn test_validation_unsupported_strategy() {
        let result = PipelineConfig::builder().missing_strategy("knn").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::UnsupportedStrategy { field, .. } if field == "missing_strategy"
        ));

        let result = PipelineConfig::builder().feature_strategy("pca").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::UnsupportedStrategy { field, .. } if field == "feature_strategy"
        ));
    }

    #[test]
    fn test_validation_constant_needs_value() {
        let result = PipelineConfig::builder().missing_strategy("constant").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::MissingFillValue
        ));

        let config = PipelineConfig::builder()
            .missing_strategy("constant")
            .fill_value(FillValue::Number(0.0))
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_validation_invalid_test_size() {
        for test_size in [0.0, 1.0, 1.5] {
            let result = PipelineConfig::builder().test_size(test_size).build();
            assert!(matches!(
                result.unwrap_err(),
                ConfigValidationError::InvalidTestSize(_)
            ));
        }
    }

    #[test]
    fn test_validation_invalid_threshold_and_target() {
        assert!(matches!(
            PipelineConfig::builder().zscore_threshold(0.0).build().unwrap_err(),
            ConfigValidationError::InvalidThreshold(_)
        ));
        assert!(matches!(
            PipelineConfig::builder().target_column(" ").build().unwrap_err(),
            ConfigValidationError::EmptyField(_)
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.features, deserialized.features);
        assert_eq!(config.outlier_handling, deserialized.outlier_handling);
    }

    #[test]
    fn test_pipeline_config_from_partial_json() {
        let json = r#"{
            "missing_strategy": "constant",
            "fill_value": 0,
            "outlier_detection": "iqr",
            "outlier_handling": "cap",
            "test_size": 0.25
        }"#;

        let config: PipelineConfig =
            serde_json::from_str(json).expect("Should deserialize partial JSON");

        assert_eq!(config.missing_strategy, "constant");
        assert_eq!(config.fill_value, Some(FillValue::Number(0.0)));
        assert_eq!(config.outlier_detection, OutlierDetectionMethod::Iqr);
        assert_eq!(config.outlier_handling, OutlierHandling::Cap);
        assert_eq!(config.test_size, 0.25);
        // Unspecified fields keep their defaults
        assert_eq!(config.target_column, "SalePrice");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_text_fill_value_from_json() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"missing_strategy": "constant", "fill_value": "None"}"#)
                .unwrap();
        assert_eq!(config.fill_value, Some(FillValue::Text("None".to_string())));
    }
}
