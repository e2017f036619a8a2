use crate::config::PipelineConfig;
use crate::error::Result;
use crate::splitter::SplitData;
use crate::utils::column_names;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

// ============================================================================
// Report Types
// ============================================================================

/// Shape change produced by one pipeline step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step name, e.g. "handle_missing_values"
    pub step: String,
    /// Strategy and parameters used
    pub detail: String,
    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,
}

impl StepRecord {
    pub fn new(
        step: impl Into<String>,
        detail: impl Into<String>,
        before: &DataFrame,
        after: &DataFrame,
    ) -> Self {
        Self {
            step: step.into(),
            detail: detail.into(),
            rows_before: before.height(),
            columns_before: before.width(),
            rows_after: after.height(),
            columns_after: after.width(),
        }
    }

    /// Rows removed by the step.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Sizes of the train/test partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub target_column: String,
    pub feature_columns: Vec<String>,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl SplitSummary {
    pub fn from_split(split: &SplitData) -> Self {
        Self {
            target_column: split.y_train.name().to_string(),
            feature_columns: column_names(&split.x_train),
            train_rows: split.x_train.height(),
            test_rows: split.x_test.height(),
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Path to the input archive
    pub input_file: String,
    /// Configuration the run used
    pub config: PipelineConfig,
    /// Steps in execution order
    pub steps: Vec<StepRecord>,
    pub split: SplitSummary,
    pub duration_ms: u64,
}

impl PipelineReport {
    pub fn new(
        input_file: &Path,
        config: PipelineConfig,
        steps: Vec<StepRecord>,
        split: SplitSummary,
        duration_ms: u64,
    ) -> Self {
        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.display().to_string(),
            config,
            steps,
            split,
            duration_ms,
        }
    }

    /// Shape of the raw dataset, if any step ran.
    pub fn initial_shape(&self) -> Option<(usize, usize)> {
        self.steps
            .first()
            .map(|s| (s.rows_before, s.columns_before))
    }

    /// Shape of the dataset handed to the splitter.
    pub fn final_shape(&self) -> Option<(usize, usize)> {
        self.steps.last().map(|s| (s.rows_after, s.columns_after))
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Writes reports and split partitions to an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PathBuf::from("output"))
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a report to a JSON file.
    ///
    /// The report is written to the output directory with the specified base name.
    /// For example, if `report_base_name` is "archive", the file will be "archive_report.json".
    pub fn write_report_to_file(
        &self,
        report: &PipelineReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }

    /// Write the four split partitions as CSV files named
    /// `{base}_x_train.csv`, `{base}_x_test.csv`, `{base}_y_train.csv` and
    /// `{base}_y_test.csv`.
    pub fn write_split(&self, split: &SplitData, base_name: &str) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut frames = [
            ("x_train", split.x_train.clone()),
            ("x_test", split.x_test.clone()),
            ("y_train", DataFrame::new(vec![split.y_train.clone().into()])?),
            ("y_test", DataFrame::new(vec![split.y_test.clone().into()])?),
        ];

        let mut paths = Vec::with_capacity(frames.len());
        for (part, df) in frames.iter_mut() {
            let path = self.output_dir.join(format!("{base_name}_{part}.csv"));
            let mut file = File::create(&path)?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(b',')
                .finish(df)?;
            info!("Dataset saved: {}", path.display());
            paths.push(path);
        }
        Ok(paths)
    }
}
