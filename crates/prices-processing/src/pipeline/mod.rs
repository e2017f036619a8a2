//! Pipeline module.
//!
//! This module provides the training-data pipeline and its progress reporting.

mod builder;
pub mod progress;

pub use builder::{PipelineResult, TrainingPipeline, TrainingPipelineBuilder, base_name};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
