//! Run reports and split output.
//!
//! A [`PipelineReport`] records what each pipeline step did to the shape of
//! the data. The same report backs the CLI's `--json` output and the file
//! written with `--emit-report`.
//!
//! # Example
//!
//! ```rust,ignore
//! use prices_processing::reporting::ReportGenerator;
//!
//! let result = pipeline.run(Path::new("data/archive.zip"))?;
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report_to_file(&result.report, "archive")?;
//! generator.write_split(&result.split, "archive")?;
//! ```

mod generator;

pub use generator::{PipelineReport, ReportGenerator, SplitSummary, StepRecord};
