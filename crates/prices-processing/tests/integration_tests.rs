//! Integration tests for the house-price preprocessing pipeline.
//!
//! These tests run the steps and the full pipeline over a small sample of the
//! Ames housing data, zipped at test time.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use prices_processing::analysis::{
    DataInspector, MissingValuesAnalysis, SimpleMissingValuesAnalysis,
    SummaryStatisticsInspectionStrategy,
};
use prices_processing::features::{OneHotEncoding, StandardScaling, inverse_log_transform};
use prices_processing::missing::{Axis, DropMissingValuesStrategy, FillMethod, FillMissingValuesStrategy};
use prices_processing::outliers::IqrOutlierDetection;
use prices_processing::utils::column_names;
use prices_processing::{
    FeatureEngineer, MissingValueHandler, OutlierDetectionMethod, OutlierDetectionStrategy,
    OutlierHandling, PipelineConfig, PipelineStage, PreprocessingError, ReportGenerator,
    TrainingPipeline, data_ingestion_step, feature_engineering_step, handle_missing_values_step,
    read_csv,
};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use ::zip::ZipWriter;
use ::zip::write::SimpleFileOptions;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_sample() -> DataFrame {
    read_csv(&fixtures_path().join("housing_sample.csv")).expect("Failed to read fixture")
}

/// Zip the sample fixture into `dir` and return the archive path.
fn zip_sample(dir: &Path) -> PathBuf {
    let content = fs::read(fixtures_path().join("housing_sample.csv")).unwrap();
    let path = dir.join("archive.zip");
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    writer
        .start_file("AmesHousing.csv", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(&content).unwrap();
    writer.finish().unwrap();
    path
}

fn config_in(tmp: &TempDir) -> prices_processing::PipelineConfigBuilder {
    PipelineConfig::builder()
        .extract_dir(tmp.path().join("extracted"))
        .output_dir(tmp.path().join("output"))
}

fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .as_materialized_series()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

// ============================================================================
// Ingestion Tests
// ============================================================================

#[test]
fn test_ingest_zipped_sample() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());

    let df = data_ingestion_step(&archive, &tmp.path().join("extracted")).unwrap();

    assert_eq!(df.shape(), (20, 6));
    assert_eq!(
        column_names(&df),
        vec![
            "Order",
            "Lot Frontage",
            "Gr Liv Area",
            "Neighborhood",
            "Overall Qual",
            "SalePrice"
        ]
    );
    assert_eq!(df.column("Lot Frontage").unwrap().null_count(), 3);
}

#[test]
fn test_ingest_rejects_plain_csv() {
    let tmp = TempDir::new().unwrap();
    let err = data_ingestion_step(
        &fixtures_path().join("housing_sample.csv"),
        &tmp.path().join("extracted"),
    )
    .unwrap_err();
    assert!(matches!(err, PreprocessingError::UnsupportedFileType(_)));
}

// ============================================================================
// Step Tests
// ============================================================================

#[test]
fn test_fill_strategies_leave_no_numeric_nulls() {
    let df = load_sample();

    for method in ["mean", "median", "mode"] {
        let filled = handle_missing_values_step(&df, method, None).unwrap();
        assert_eq!(filled.shape(), df.shape(), "shape changed for {method}");
        assert_eq!(
            filled.column("Lot Frontage").unwrap().null_count(),
            0,
            "nulls left by {method}"
        );
    }
}

#[test]
fn test_drop_rows_removes_incomplete_rows() {
    let df = load_sample();
    let handler = MissingValueHandler::new(DropMissingValuesStrategy::new(Axis::Rows, None));

    let cleaned = handler.handle_missing_values(&df).unwrap();

    assert_eq!(cleaned.height(), 17);
    assert_eq!(cleaned.width(), 6);
}

#[test]
fn test_drop_columns_removes_incomplete_columns() {
    let df = load_sample();
    let mut handler = MissingValueHandler::new(FillMissingValuesStrategy::new(FillMethod::Mean));
    handler.set_strategy(DropMissingValuesStrategy::new(Axis::Columns, None));

    let cleaned = handler.handle_missing_values(&df).unwrap();

    assert_eq!(cleaned.height(), 20);
    assert!(cleaned.column("Lot Frontage").is_err());
}

#[test]
fn test_log_transform_round_trip() {
    let df = load_sample();
    let features = vec!["SalePrice".to_string(), "Gr Liv Area".to_string()];

    let logged = feature_engineering_step(&df, "log", &features).unwrap();
    let restored = inverse_log_transform(&logged, &features).unwrap();

    for feature in &features {
        let original = f64_values(&df, feature);
        let back = f64_values(&restored, feature);
        for (a, b) in original.iter().zip(&back) {
            let (a, b) = (a.unwrap(), b.unwrap());
            assert!((a - b).abs() < 1e-6 * a.abs().max(1.0), "{a} != {b}");
        }
    }
}

#[test]
fn test_standard_scaling_centers_features() {
    let df = load_sample();
    let engineer = FeatureEngineer::new(StandardScaling::new(["Gr Liv Area"]));

    let scaled = engineer.apply_feature_engineering(&df).unwrap();
    let values: Vec<f64> = f64_values(&scaled, "Gr Liv Area").into_iter().flatten().collect();
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    assert!(mean.abs() < 1e-9);
    assert_eq!(scaled.column("SalePrice").unwrap().dtype(), &DataType::Int64);
}

#[test]
fn test_onehot_neighborhood_rows_sum_to_one() {
    let df = load_sample();
    let engineer = FeatureEngineer::new(OneHotEncoding::new(["Neighborhood"]));

    let encoded = engineer.apply_feature_engineering(&df).unwrap();

    let encoded_names: Vec<String> = column_names(&encoded)
        .into_iter()
        .filter(|name| name.starts_with("Neighborhood_"))
        .collect();
    assert_eq!(
        encoded_names,
        vec![
            "Neighborhood_Gilbert",
            "Neighborhood_NAmes",
            "Neighborhood_NridgHt",
            "Neighborhood_Sawyer",
            "Neighborhood_StoneBr"
        ]
    );
    assert!(encoded.column("Neighborhood").is_err());

    for row in 0..encoded.height() {
        let hot = encoded_names
            .iter()
            .filter(|name| {
                encoded
                    .column(name)
                    .unwrap()
                    .as_materialized_series()
                    .bool()
                    .unwrap()
                    .get(row)
                    .unwrap_or(false)
            })
            .count();
        assert_eq!(hot, 1, "row {row}");
    }
}

#[test]
fn test_iqr_flags_the_mansion() {
    let df = load_sample().select(["SalePrice"]).unwrap();

    let mask = IqrOutlierDetection.detect_outliers(&df).unwrap();
    let flagged: Vec<usize> = mask
        .column("SalePrice")
        .unwrap()
        .as_materialized_series()
        .bool()
        .unwrap()
        .into_iter()
        .enumerate()
        .filter(|(_, flag)| flag.unwrap_or(false))
        .map(|(idx, _)| idx)
        .collect();

    assert_eq!(flagged, vec![15]);
}

#[test]
fn test_outlier_cap_keeps_every_row() {
    let df = load_sample().select(["SalePrice", "Gr Liv Area"]).unwrap();
    let detector = OutlierDetectionMethod::Iqr.detector(3.0);

    let capped = detector.handle_outliers(&df, OutlierHandling::Cap).unwrap();
    let removed = detector.handle_outliers(&df, OutlierHandling::Remove).unwrap();

    assert_eq!(capped.height(), 20);
    assert!(removed.height() < 20);
    let max_price = f64_values(&capped, "SalePrice")
        .into_iter()
        .flatten()
        .fold(f64::MIN, f64::max);
    assert!(max_price < 755_000.0);
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_defaults() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());

    let result = TrainingPipeline::builder()
        .config(config_in(&tmp).save_report(true).build().unwrap())
        .build()
        .unwrap()
        .run(&archive)
        .unwrap();

    // Mean fill, log of SalePrice and Gr Liv Area, then z-score removal of the mansion
    let split = &result.split;
    assert_eq!(split.x_train.height() + split.x_test.height(), 19);
    assert_eq!(split.x_test.height(), 4);
    assert_eq!(split.y_train.len(), split.x_train.height());
    assert_eq!(split.y_train.name().as_str(), "SalePrice");
    assert_eq!(
        column_names(&split.x_train),
        vec!["Order", "Lot Frontage", "Gr Liv Area", "Overall Qual"]
    );
    assert_eq!(split.x_train.column("Lot Frontage").unwrap().null_count(), 0);

    let report = &result.report;
    let steps: Vec<&str> = report.steps.iter().map(|s| s.step.as_str()).collect();
    assert_eq!(
        steps,
        vec!["handle_missing_values", "feature_engineering", "outlier_detection"]
    );
    assert_eq!(report.initial_shape(), Some((20, 6)));
    assert_eq!(report.final_shape(), Some((19, 5)));
    assert_eq!(report.steps[2].rows_removed(), 1);

    let report_path = result.report_path.expect("report should be written");
    assert_eq!(report_path, tmp.path().join("output/archive_report.json"));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(json["split"]["test_rows"], 4);
}

#[test]
fn test_full_pipeline_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());
    let pipeline = TrainingPipeline::builder()
        .config(config_in(&tmp).build().unwrap())
        .build()
        .unwrap();

    let first = pipeline.run(&archive).unwrap();
    let second = pipeline.run(&archive).unwrap();

    assert!(first.split.x_test.equals(&second.split.x_test));
    assert!(first.split.y_train.equals(&second.split.y_train));
    assert!(first.report_path.is_none());
}

#[test]
fn test_full_pipeline_from_json_config() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());
    let config_path = tmp.path().join("config.json");
    fs::write(
        &config_path,
        format!(
            r#"{{
                "extract_dir": {:?},
                "missing_strategy": "median",
                "feature_strategy": "standard_scaling",
                "features": ["Gr Liv Area"],
                "outlier_detection": "iqr",
                "outlier_handling": "cap",
                "test_size": 0.25
            }}"#,
            tmp.path().join("extracted")
        ),
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&config_path).unwrap();
    let result = TrainingPipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(&archive)
        .unwrap();

    // Capping keeps every row
    assert_eq!(result.split.x_train.height(), 15);
    assert_eq!(result.split.x_test.height(), 5);
    assert_eq!(result.report.config.outlier_handling, OutlierHandling::Cap);
}

#[test]
fn test_full_pipeline_progress_stages() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());
    let updates = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    TrainingPipeline::builder()
        .config(config_in(&tmp).build().unwrap())
        .on_progress(move |update| {
            updates_clone
                .lock()
                .unwrap()
                .push((update.stage, update.progress));
        })
        .build()
        .unwrap()
        .run(&archive)
        .unwrap();

    let updates = updates.lock().unwrap();
    let mut stages: Vec<PipelineStage> = updates.iter().map(|(stage, _)| *stage).collect();
    stages.dedup();
    assert_eq!(
        stages,
        vec![
            PipelineStage::Ingestion,
            PipelineStage::MissingValues,
            PipelineStage::FeatureEngineering,
            PipelineStage::OutlierHandling,
            PipelineStage::Splitting,
            PipelineStage::ReportGeneration,
            PipelineStage::Complete,
        ]
    );

    // Overall progress never goes backwards
    for pair in updates.windows(2) {
        assert!(pair[1].1 >= pair[0].1, "{:?} -> {:?}", pair[0], pair[1]);
    }
}

#[test]
fn test_full_pipeline_missing_target() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    let err = TrainingPipeline::builder()
        .config(config_in(&tmp).target_column("Price").build().unwrap())
        .on_progress(move |update| stages_clone.lock().unwrap().push(update.stage))
        .build()
        .unwrap()
        .run(&archive)
        .unwrap_err();

    assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    assert_eq!(stages.lock().unwrap().last(), Some(&PipelineStage::Failed));
}

#[test]
fn test_write_split_round_trip() {
    let tmp = TempDir::new().unwrap();
    let archive = zip_sample(tmp.path());
    let result = TrainingPipeline::builder()
        .config(config_in(&tmp).build().unwrap())
        .build()
        .unwrap()
        .run(&archive)
        .unwrap();

    let paths = ReportGenerator::new(tmp.path().join("splits"))
        .write_split(&result.split, "archive")
        .unwrap();
    assert_eq!(paths.len(), 4);

    let x_train = read_csv(&tmp.path().join("splits/archive_x_train.csv")).unwrap();
    assert_eq!(x_train.shape(), result.split.x_train.shape());
    let y_test = read_csv(&tmp.path().join("splits/archive_y_test.csv")).unwrap();
    assert_eq!(y_test.height(), result.split.y_test.len());
}

// ============================================================================
// Analysis Tests
// ============================================================================

#[test]
fn test_summary_and_missing_analysis_render() {
    let df = load_sample();

    let mut summary = Vec::new();
    DataInspector::new(SummaryStatisticsInspectionStrategy)
        .execute_strategy(&df, &mut summary)
        .unwrap();
    let summary = String::from_utf8(summary).unwrap();
    assert!(summary.contains("SalePrice"));
    assert!(summary.contains("Neighborhood"));

    let mut missing = Vec::new();
    SimpleMissingValuesAnalysis.analyze(&df, &mut missing).unwrap();
    let missing = String::from_utf8(missing).unwrap();
    assert!(missing.contains("Lot Frontage"));
    assert!(!missing.contains("Gr Liv Area:"));
}
