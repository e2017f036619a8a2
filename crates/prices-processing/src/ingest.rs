//! Data ingestion from zip archives and CSV files.

use crate::error::{PreprocessingError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use ::zip::ZipArchive;

/// Directory archives are extracted into unless configured otherwise.
pub const DEFAULT_EXTRACT_DIR: &str = "extracted_data";

/// Contract for loading a dataset from a file.
pub trait DataIngestor: Send + Sync {
    fn ingest(&self, file_path: &Path) -> Result<DataFrame>;
}

/// Extracts a `.zip` archive and loads the single CSV file it contains.
///
/// Extracted files are left in place, including after a failure.
#[derive(Debug, Clone)]
pub struct ZipDataIngestor {
    extract_dir: PathBuf,
}

impl ZipDataIngestor {
    pub fn new(extract_dir: impl Into<PathBuf>) -> Self {
        Self {
            extract_dir: extract_dir.into(),
        }
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }
}

impl Default for ZipDataIngestor {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACT_DIR)
    }
}

impl DataIngestor for ZipDataIngestor {
    fn ingest(&self, file_path: &Path) -> Result<DataFrame> {
        if extension_of(file_path) != ".zip" {
            return Err(PreprocessingError::UnsupportedFileType(format!(
                "'{}' is not a .zip file",
                file_path.display()
            )));
        }

        info!(
            "Extracting {} into {}",
            file_path.display(),
            self.extract_dir.display()
        );
        let file = File::open(file_path)
            .context(format!("Failed to open archive '{}'", file_path.display()))?;
        let mut archive = ZipArchive::new(file)?;
        debug!("Archive holds {} entries", archive.len());
        archive.extract(&self.extract_dir)?;

        let csv_path = single_csv_in(&self.extract_dir)?;
        info!("Loading {}", csv_path.display());
        read_csv(&csv_path)
    }
}

/// Find the one CSV file directly inside `dir`.
fn single_csv_in(dir: &Path) -> Result<PathBuf> {
    let mut csv_files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && extension_of(path) == ".csv")
        .collect();
    csv_files.sort();

    match csv_files.len() {
        0 => Err(PreprocessingError::NoCsvFound(dir.to_path_buf())),
        1 => Ok(csv_files.remove(0)),
        _ => Err(PreprocessingError::MultipleCsvFound(
            csv_files
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect(),
        )),
    }
}

/// Lowercased extension with its leading dot, or an empty string.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Picks an ingestor for a file extension.
pub struct DataIngestorFactory;

impl DataIngestorFactory {
    /// Return the ingestor for `file_extension` (such as `".zip"`).
    pub fn get_data_ingestor(file_extension: &str) -> Result<Box<dyn DataIngestor>> {
        Self::get_data_ingestor_with_dir(file_extension, DEFAULT_EXTRACT_DIR)
    }

    /// Like [`get_data_ingestor`](Self::get_data_ingestor) with a custom
    /// extraction directory.
    pub fn get_data_ingestor_with_dir(
        file_extension: &str,
        extract_dir: impl Into<PathBuf>,
    ) -> Result<Box<dyn DataIngestor>> {
        match file_extension.to_lowercase().as_str() {
            ".zip" => Ok(Box::new(ZipDataIngestor::new(extract_dir))),
            other => Err(PreprocessingError::UnsupportedFileType(format!(
                "no ingestor available for file extension: {other}"
            ))),
        }
    }
}

/// Ingest `file_path` with the ingestor matching its extension.
pub fn data_ingestion_step(file_path: &Path, extract_dir: &Path) -> Result<DataFrame> {
    let ingestor =
        DataIngestorFactory::get_data_ingestor_with_dir(&extension_of(file_path), extract_dir)?;
    let df = ingestor.ingest(file_path)?;
    info!("Ingested {} rows x {} columns", df.height(), df.width());
    Ok(df)
}

/// Read a CSV file with a header row.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .context(format!("Failed to read CSV '{}'", path.display()))?;
    Ok(df)
}

/// Load a dataset from either a CSV file or a zip archive.
pub fn load_dataset(path: &Path, extract_dir: &Path) -> Result<DataFrame> {
    match extension_of(path).as_str() {
        ".csv" => read_csv(path),
        _ => data_ingestion_step(path, extract_dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use ::zip::ZipWriter;
    use ::zip::write::SimpleFileOptions;

    const CSV: &str = "Order,SalePrice,Neighborhood\n1,215000,NAmes\n2,105000,Gilbert\n";

    fn write_zip(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
        let path = dir.join("archive.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_zip_ingest_single_csv() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(tmp.path(), &[("AmesHousing.csv", CSV)]);
        let extract_dir = tmp.path().join("extracted");

        let df = ZipDataIngestor::new(&extract_dir).ingest(&archive).unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert!(extract_dir.join("AmesHousing.csv").exists());
    }

    #[test]
    fn test_zip_ingest_rejects_other_extensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.csv");
        fs::write(&path, CSV).unwrap();

        let err = ZipDataIngestor::new(tmp.path().join("out"))
            .ingest(&path)
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FILE_TYPE");
    }

    #[test]
    fn test_zip_without_csv() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(tmp.path(), &[("README.txt", "no data here")]);

        let err = ZipDataIngestor::new(tmp.path().join("out"))
            .ingest(&archive)
            .unwrap_err();
        assert!(matches!(err, PreprocessingError::NoCsvFound(_)));
    }

    #[test]
    fn test_empty_zip() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(tmp.path(), &[]);

        let err = ZipDataIngestor::new(tmp.path().join("out"))
            .ingest(&archive)
            .unwrap_err();
        assert_eq!(err.error_code(), "NO_CSV_FOUND");
    }

    #[test]
    fn test_zip_with_several_csvs() {
        let tmp = TempDir::new().unwrap();
        let archive = write_zip(tmp.path(), &[("a.csv", CSV), ("b.csv", CSV)]);

        let err = ZipDataIngestor::new(tmp.path().join("out"))
            .ingest(&archive)
            .unwrap_err();
        match err {
            PreprocessingError::MultipleCsvFound(names) => {
                assert_eq!(names, vec!["a.csv".to_string(), "b.csv".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_factory() {
        assert!(DataIngestorFactory::get_data_ingestor(".zip").is_ok());
        assert!(DataIngestorFactory::get_data_ingestor(".ZIP").is_ok());
        let err = DataIngestorFactory::get_data_ingestor(".json").err().unwrap();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_load_dataset_reads_plain_csv() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("houses.csv");
        fs::write(&path, CSV).unwrap();

        let df = load_dataset(&path, &tmp.path().join("out")).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("SalePrice").unwrap().dtype(), &DataType::Int64);
    }
}
