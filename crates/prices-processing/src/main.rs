//! CLI entry point for the house-price preprocessing pipeline.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use polars::prelude::DataFrame;
use prices_processing::analysis::{
    BivariateAnalyzer, CategoricalUnivariateAnalysis, CategoricalVsNumericalAnalysis,
    DataInspector, DataTypesInspectionStrategy, MissingValuesAnalysis,
    MultivariateAnalysis, NumericalUnivariateAnalysis, NumericalVsNumericalAnalysis,
    SimpleMissingValuesAnalysis, SimpleMultivariateAnalysis, SummaryStatisticsInspectionStrategy,
    UnivariateAnalyzer,
};
use prices_processing::ingest::DEFAULT_EXTRACT_DIR;
use prices_processing::outliers::ZScoreOutlierDetection;
use prices_processing::pipeline::base_name;
use prices_processing::utils::is_numeric_dtype;
use prices_processing::{
    FillValue, OutlierDetectionMethod, OutlierHandling, PipelineConfig, PipelineResult,
    ReportGenerator, TrainingPipeline, load_dataset,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

/// CLI-compatible outlier detection method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierDetection {
    /// Flag values more than the threshold standard deviations from the mean
    Zscore,
    /// Flag values outside 1.5 IQR beyond the quartiles
    Iqr,
}

impl From<CliOutlierDetection> for OutlierDetectionMethod {
    fn from(cli: CliOutlierDetection) -> Self {
        match cli {
            CliOutlierDetection::Zscore => OutlierDetectionMethod::Zscore,
            CliOutlierDetection::Iqr => OutlierDetectionMethod::Iqr,
        }
    }
}

/// CLI-compatible outlier handling enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierHandling {
    /// Remove rows flagged in any column
    Remove,
    /// Clip every column to its 1st and 99th percentiles
    Cap,
}

impl From<CliOutlierHandling> for OutlierHandling {
    fn from(cli: CliOutlierHandling) -> Self {
        match cli {
            CliOutlierHandling::Remove => OutlierHandling::Remove,
            CliOutlierHandling::Cap => OutlierHandling::Cap,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Preprocessing pipeline for house-price prediction",
    long_about = "Prepares a house-price dataset for model training.\n\n\
                  EXAMPLES:\n  \
                  # Run the default pipeline on a zipped CSV\n  \
                  prices-processing run -i data/archive.zip\n\n  \
                  # Median fill, scaled features, capped outliers\n  \
                  prices-processing run -i data/archive.zip --missing-strategy median \\\n    \
                  --feature-strategy standard_scaling --outlier-handling cap\n\n  \
                  # Summary statistics of a CSV\n  \
                  prices-processing inspect -i AmesHousing.csv summary"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the training-data pipeline on a zip archive
    Run(RunArgs),
    /// Inspect a CSV file or zip archive without changing it
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the zip archive holding one CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the archive is extracted into
    #[arg(long)]
    extract_dir: Option<PathBuf>,

    /// Missing-value strategy (drop, mean, median, mode, constant)
    #[arg(long)]
    missing_strategy: Option<String>,

    /// Fill value for the constant strategy; numbers are parsed as numbers
    #[arg(long)]
    fill_value: Option<String>,

    /// Feature engineering strategy (log, standard_scaling, minmax_scaling, onehot_encoding)
    #[arg(long)]
    feature_strategy: Option<String>,

    /// Features to transform, comma separated
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Column that must exist for outlier detection
    #[arg(long)]
    outlier_column: Option<String>,

    /// Outlier detection method
    #[arg(long, value_enum)]
    outlier_detection: Option<CliOutlierDetection>,

    /// Absolute z-score above which a value is an outlier
    #[arg(long)]
    zscore_threshold: Option<f64>,

    /// What to do with detected outliers
    #[arg(long, value_enum)]
    outlier_handling: Option<CliOutlierHandling>,

    /// Target column for the split
    #[arg(short, long)]
    target: Option<String>,

    /// Share of rows held out for testing
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    random_state: Option<u64>,

    /// Output directory for reports and split files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write a JSON run report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Write x_train, x_test, y_train and y_test CSV files to the output directory
    #[arg(long)]
    save_splits: bool,

    /// Output the run report as JSON to stdout instead of a summary
    ///
    /// Disables all progress logs. Useful for piping: `... --json | jq .split`
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Path to a CSV file or a zip archive holding one CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Directory a zip archive is extracted into
    #[arg(long, default_value = DEFAULT_EXTRACT_DIR)]
    extract_dir: PathBuf,

    #[command(subcommand)]
    view: InspectView,
}

#[derive(Subcommand, Debug)]
enum InspectView {
    /// Data types and non-null counts
    Dtypes,
    /// Summary statistics for numeric and text columns
    Summary,
    /// Missing-value counts and heat strip
    Missing,
    /// Distribution of a single feature
    Univariate {
        feature: String,
        /// Histogram bins for numeric features
        #[arg(long, default_value = "30")]
        bins: usize,
    },
    /// Relationship between two features
    Bivariate { feature1: String, feature2: String },
    /// Correlation heatmap and pair plot of numeric columns
    Multivariate,
    /// Box-plot summaries for the given features
    Outliers {
        #[arg(value_delimiter = ',', required = true)]
        features: Vec<String>,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json_output = matches!(&cli.command, Command::Run(args) if args.json);
    init_logging(&cli.log_level, cli.quiet, json_output);

    match cli.command {
        Command::Run(args) => run(args, cli.quiet),
        Command::Inspect(args) => inspect(args),
    }
}

/// Build the configuration: JSON file (or defaults) first, then flag overrides.
fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = &args.extract_dir {
        config.extract_dir = dir.clone();
    }
    if let Some(strategy) = &args.missing_strategy {
        config.missing_strategy = strategy.clone();
    }
    if let Some(value) = &args.fill_value {
        config.fill_value = Some(parse_fill_value(value));
    }
    if let Some(strategy) = &args.feature_strategy {
        config.feature_strategy = strategy.clone();
    }
    if let Some(features) = &args.features {
        config.features = features.iter().map(|f| f.trim().to_string()).collect();
    }
    if let Some(column) = &args.outlier_column {
        config.outlier_column = column.clone();
    }
    if let Some(method) = args.outlier_detection {
        config.outlier_detection = method.into();
    }
    if let Some(threshold) = args.zscore_threshold {
        config.zscore_threshold = threshold;
    }
    if let Some(handling) = args.outlier_handling {
        config.outlier_handling = handling.into();
    }
    if let Some(target) = &args.target {
        config.target_column = target.clone();
    }
    if let Some(test_size) = args.test_size {
        config.test_size = test_size;
    }
    if let Some(seed) = args.random_state {
        config.random_state = seed;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if args.emit_report {
        config.save_report = true;
    }

    Ok(config)
}

fn parse_fill_value(raw: &str) -> FillValue {
    match raw.parse::<f64>() {
        Ok(number) => FillValue::Number(number),
        Err(_) => FillValue::Text(raw.to_string()),
    }
}

fn run(args: RunArgs, quiet: bool) -> Result<()> {
    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = build_config(&args)?;

    let mut builder = TrainingPipeline::builder().config(config);
    if !quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let result = match pipeline.run(&args.input) {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    let split_paths = if args.save_splits {
        ReportGenerator::new(pipeline.config().output_dir.clone())
            .write_split(&result.split, &base_name(&args.input))?
    } else {
        Vec::new()
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    print_human_readable_summary(&result, &split_paths, &args);
    Ok(())
}

/// Print a human-readable summary of the pipeline run.
///
/// Uses `println!` so the summary is visible regardless of log level.
fn print_human_readable_summary(result: &PipelineResult, split_paths: &[PathBuf], args: &RunArgs) {
    let report = &result.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("PIPELINE COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!("Input: {}", report.input_file);
    if let (Some((rows_in, cols_in)), Some((rows_out, cols_out))) =
        (report.initial_shape(), report.final_shape())
    {
        println!(
            "Shape: {} rows x {} columns -> {} rows x {} columns",
            rows_in, cols_in, rows_out, cols_out
        );
    }
    println!("Duration: {}ms", report.duration_ms);
    println!();

    println!("Steps:");
    for step in &report.steps {
        println!(
            "  - {:<22} {:<30} {:>6} -> {:<6} rows, {:>3} -> {:<3} columns",
            step.step,
            step.detail,
            step.rows_before,
            step.rows_after,
            step.columns_before,
            step.columns_after
        );
    }
    println!();

    println!("Split (target: {}):", report.split.target_column);
    println!("  Train rows: {}", report.split.train_rows);
    println!("  Test rows:  {}", report.split.test_rows);
    println!("  Features:   {}", report.split.feature_columns.len());
    println!();

    if let Some(path) = &result.report_path {
        println!("Report: {}", path.display());
    }
    for path in split_paths {
        println!("Saved: {}", path.display());
    }

    println!("Use --json for machine-readable output");
    if !args.emit_report {
        println!("Use --emit-report to save a JSON report");
    }
    if !args.save_splits {
        println!("Use --save-splits to write the train/test CSV files");
    }
    println!("{}", "=".repeat(80));
}

fn inspect(args: InspectArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let df = load_dataset(&args.input, &args.extract_dir)?;
    info!("Dataset loaded: {:?}", df.shape());

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.view {
        InspectView::Dtypes => {
            DataInspector::new(DataTypesInspectionStrategy).execute_strategy(&df, &mut out)?
        }
        InspectView::Summary => {
            DataInspector::new(SummaryStatisticsInspectionStrategy).execute_strategy(&df, &mut out)?
        }
        InspectView::Missing => SimpleMissingValuesAnalysis.analyze(&df, &mut out)?,
        InspectView::Univariate { feature, bins } => {
            let analyzer = if column_is_numeric(&df, feature)? {
                UnivariateAnalyzer::new(NumericalUnivariateAnalysis::new(*bins))
            } else {
                UnivariateAnalyzer::new(CategoricalUnivariateAnalysis)
            };
            analyzer.execute_analysis(&df, feature, &mut out)?
        }
        InspectView::Bivariate { feature1, feature2 } => {
            let analyzer = if column_is_numeric(&df, feature1)? {
                BivariateAnalyzer::new(NumericalVsNumericalAnalysis)
            } else {
                BivariateAnalyzer::new(CategoricalVsNumericalAnalysis)
            };
            analyzer.execute_strategy(&df, feature1, feature2, &mut out)?
        }
        InspectView::Multivariate => SimpleMultivariateAnalysis.analyze(&df, &mut out)?,
        InspectView::Outliers { features } => OutlierDetectionMethod::default()
            .detector(ZScoreOutlierDetection::DEFAULT_THRESHOLD)
            .visualize_outliers(&df, features, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

fn column_is_numeric(df: &DataFrame, name: &str) -> Result<bool> {
    let column = df
        .column(name)
        .map_err(|_| anyhow!("Column '{}' not found in dataset", name))?;
    Ok(is_numeric_dtype(column.dtype()))
}
