//! House-Price Preprocessing Library
//!
//! Strategy-based preprocessing for house-price prediction, built on Polars.
//!
//! # Overview
//!
//! Every preprocessing concern is a family of interchangeable strategies
//! behind a small context object that owns one strategy at a time:
//!
//! - **Missing Values**: drop rows/columns, or fill with mean, median, mode or a constant
//! - **Feature Engineering**: log transform, standard and min-max scaling, one-hot encoding
//! - **Outlier Detection**: z-score and IQR masks, removal or percentile capping
//! - **Splitting**: seeded train/test split on a target column
//! - **Analysis**: text-rendered inspection, univariate, bivariate and multivariate views
//! - **Ingestion**: zip archives holding exactly one CSV file
//!
//! [`TrainingPipeline`] chains ingestion, missing values, feature engineering,
//! outliers and splitting with stage-level progress reporting.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use prices_processing::{PipelineConfig, TrainingPipeline};
//! use std::path::Path;
//!
//! let config = PipelineConfig::builder()
//!     .missing_strategy("median")
//!     .feature_strategy("log")
//!     .features(["SalePrice", "Gr Liv Area"])
//!     .build()?;
//!
//! let result = TrainingPipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(Path::new("data/archive.zip"))?;
//!
//! println!("train rows: {}", result.split.x_train.height());
//! ```
//!
//! # Strategies
//!
//! Contexts can be used directly and re-pointed at another strategy:
//!
//! ```rust,ignore
//! use prices_processing::missing::{Axis, DropMissingValuesStrategy, FillMethod,
//!     FillMissingValuesStrategy, MissingValueHandler};
//!
//! let mut handler = MissingValueHandler::new(DropMissingValuesStrategy::new(Axis::Rows, None));
//! let dropped = handler.handle_missing_values(&df)?;
//!
//! handler.set_strategy(FillMissingValuesStrategy::new(FillMethod::Median));
//! let filled = handler.handle_missing_values(&df)?;
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod ingest;
pub mod missing;
pub mod outliers;
pub mod pipeline;
pub mod reporting;
pub mod splitter;
pub mod stats;
pub mod steps;
pub mod utils;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{ErrorCategory, PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use features::{FeatureEngineer, FeatureEngineeringStrategy};
pub use ingest::{DataIngestor, DataIngestorFactory, ZipDataIngestor, load_dataset, read_csv};
pub use missing::{FillValue, MissingValueHandler, MissingValueHandlingStrategy};
pub use outliers::{OutlierDetectionMethod, OutlierDetectionStrategy, OutlierDetector, OutlierHandling};
pub use pipeline::{
    ClosureProgressReporter, PipelineResult, PipelineStage, ProgressReporter, ProgressUpdate,
    TrainingPipeline, TrainingPipelineBuilder,
};
pub use reporting::{PipelineReport, ReportGenerator, SplitSummary, StepRecord};
pub use splitter::{DataSplitter, DataSplitterStrategy, SimpleTrainTestSplitStrategy, SplitData};
pub use steps::{
    data_ingestion_step, data_splitter_step, feature_engineering_step,
    handle_missing_values_step, outlier_detection_step,
};
