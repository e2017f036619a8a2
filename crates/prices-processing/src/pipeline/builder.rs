//! Training-data pipeline.
//!
//! This module provides the `TrainingPipeline` struct and builder for
//! running ingestion, cleaning, feature engineering, outlier handling and
//! splitting in a fixed order.

use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{PipelineReport, ReportGenerator, SplitSummary, StepRecord};
use crate::splitter::SplitData;
use crate::steps::{
    data_ingestion_step, data_splitter_step, feature_engineering_step,
    handle_missing_values_step, outlier_detection_step,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Output of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Train/test partitions ready for model training
    pub split: SplitData,
    /// Summary of every step
    pub report: PipelineReport,
    /// Where the report was written, when `save_report` is set
    pub report_path: Option<PathBuf>,
}

/// The training-data pipeline.
///
/// Use [`TrainingPipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use prices_processing::{PipelineConfig, TrainingPipeline};
///
/// let result = TrainingPipeline::builder()
///     .config(PipelineConfig::builder().missing_strategy("median").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(Path::new("data/archive.zip"))?;
///
/// println!("train rows: {}", result.split.x_train.height());
/// ```
pub struct TrainingPipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(TrainingPipeline: Send, Sync);

impl TrainingPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> TrainingPipelineBuilder {
        TrainingPipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline on a zip archive holding a single CSV file.
    ///
    /// Reports `Complete` on success and `Failed` on the first error.
    pub fn run(&self, input: &Path) -> Result<PipelineResult> {
        match self.run_internal(input) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self, input: &Path) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let config = &self.config;
        let mut steps = Vec::with_capacity(3);

        info!("Starting training pipeline for {}", input.display());

        // Step 1: Ingestion
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Ingestion,
            0.0,
            format!("Extracting {}...", input.display()),
        ));
        let raw = data_ingestion_step(input, &config.extract_dir)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Ingestion,
            1.0,
            format!("Loaded {} rows x {} columns", raw.height(), raw.width()),
        ));

        // Step 2: Missing values
        self.report_progress(ProgressUpdate::new(
            PipelineStage::MissingValues,
            0.0,
            format!("Handling missing values ({})...", config.missing_strategy),
        ));
        let filled =
            handle_missing_values_step(&raw, &config.missing_strategy, config.fill_value.clone())?;
        steps.push(StepRecord::new(
            "handle_missing_values",
            match &config.fill_value {
                Some(value) if config.missing_strategy == "constant" => {
                    format!("constant ({value})")
                }
                _ => config.missing_strategy.clone(),
            },
            &raw,
            &filled,
        ));
        drop(raw);

        // Step 3: Feature engineering
        self.report_progress(ProgressUpdate::new(
            PipelineStage::FeatureEngineering,
            0.0,
            format!("Applying {} to {:?}...", config.feature_strategy, config.features),
        ));
        let engineered =
            feature_engineering_step(&filled, &config.feature_strategy, &config.features)?;
        steps.push(StepRecord::new(
            "feature_engineering",
            format!("{} on {}", config.feature_strategy, config.features.join(", ")),
            &filled,
            &engineered,
        ));
        drop(filled);

        // Step 4: Outliers
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierHandling,
            0.0,
            format!(
                "Detecting outliers ({}, {})...",
                config.outlier_detection, config.outlier_handling
            ),
        ));
        let cleaned = outlier_detection_step(
            &engineered,
            &config.outlier_column,
            config.outlier_detection,
            config.zscore_threshold,
            config.outlier_handling,
        )?;
        let outlier_record = StepRecord::new(
            "outlier_detection",
            format!("{}/{}", config.outlier_detection, config.outlier_handling),
            &engineered,
            &cleaned,
        );
        debug!("Outlier step removed {} rows", outlier_record.rows_removed());
        steps.push(outlier_record);
        drop(engineered);

        // Step 5: Split
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            0.0,
            format!("Splitting on '{}'...", config.target_column),
        ));
        let split = data_splitter_step(
            &cleaned,
            &config.target_column,
            config.test_size,
            config.random_state,
        )?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Splitting,
            1.0,
            format!(
                "Split into {} train and {} test rows",
                split.x_train.height(),
                split.x_test.height()
            ),
        ));

        // Step 6: Report
        self.report_progress(ProgressUpdate::new(
            PipelineStage::ReportGeneration,
            0.0,
            "Generating report...",
        ));
        let report = PipelineReport::new(
            input,
            config.clone(),
            steps,
            SplitSummary::from_split(&split),
            start_time.elapsed().as_millis() as u64,
        );

        let report_path = if config.save_report {
            let generator = ReportGenerator::new(config.output_dir.clone());
            Some(generator.write_report_to_file(&report, &base_name(input))?)
        } else {
            None
        };

        info!(
            "Pipeline completed in {}ms: {} train / {} test rows",
            report.duration_ms,
            report.split.train_rows,
            report.split.test_rows
        );

        Ok(PipelineResult {
            split,
            report,
            report_path,
        })
    }
}

/// File stem of the input, used to name output files.
pub fn base_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

/// Builder for creating a [`TrainingPipeline`] instance.
///
/// Use [`TrainingPipeline::builder()`] to get started.
#[derive(Default)]
pub struct TrainingPipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(TrainingPipelineBuilder: Send);

impl TrainingPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use prices_processing::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StageLogger;
    ///
    /// impl ProgressReporter for StageLogger {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         eprintln!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = TrainingPipeline::builder()
    ///     .progress_reporter(Arc::new(StageLogger))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<TrainingPipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(TrainingPipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
