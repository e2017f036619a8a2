//! Train/test splitting.

use crate::error::{PreprocessingError, Result};
use crate::utils::require_column;
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Features and target, split into train and test partitions.
#[derive(Debug, Clone)]
pub struct SplitData {
    pub x_train: DataFrame,
    pub x_test: DataFrame,
    pub y_train: Series,
    pub y_test: Series,
}

/// Contract for splitting strategies.
pub trait DataSplitterStrategy: Send + Sync {
    /// Split `df` into features and `target_column`, then into train and test.
    fn split_data(&self, df: &DataFrame, target_column: &str) -> Result<SplitData>;
}

/// Seeded random split into train and test partitions.
///
/// The test partition holds `ceil(test_size * n)` rows. The same seed on the
/// same frame always yields the same partitions.
#[derive(Debug, Clone)]
pub struct SimpleTrainTestSplitStrategy {
    test_size: f64,
    random_state: u64,
}

impl SimpleTrainTestSplitStrategy {
    pub const DEFAULT_TEST_SIZE: f64 = 0.2;
    pub const DEFAULT_RANDOM_STATE: u64 = 42;

    pub fn new(test_size: f64, random_state: u64) -> Self {
        Self {
            test_size,
            random_state,
        }
    }

    pub fn test_size(&self) -> f64 {
        self.test_size
    }

    pub fn random_state(&self) -> u64 {
        self.random_state
    }

    fn test_rows(&self, n: usize) -> Result<usize> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PreprocessingError::InvalidConfig(format!(
                "test_size must be between 0 and 1 (exclusive), got {}",
                self.test_size
            )));
        }
        Ok(((self.test_size * n as f64).ceil() as usize).min(n))
    }
}

impl Default for SimpleTrainTestSplitStrategy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TEST_SIZE, Self::DEFAULT_RANDOM_STATE)
    }
}

impl DataSplitterStrategy for SimpleTrainTestSplitStrategy {
    fn split_data(&self, df: &DataFrame, target_column: &str) -> Result<SplitData> {
        info!("Performing simple train-test split.");
        let target = require_column(df, target_column)?.clone();
        let features = df.drop(target_column)?;

        let n = df.height();
        let n_test = self.test_rows(n)?;

        let mut indices: Vec<IdxSize> = (0..n as IdxSize).collect();
        let mut rng = StdRng::seed_from_u64(self.random_state);
        indices.shuffle(&mut rng);
        let (test_idx, train_idx) = indices.split_at(n_test);

        let test_idx = IdxCa::from_vec("idx".into(), test_idx.to_vec());
        let train_idx = IdxCa::from_vec("idx".into(), train_idx.to_vec());

        let split = SplitData {
            x_train: features.take(&train_idx)?,
            x_test: features.take(&test_idx)?,
            y_train: target.take(&train_idx)?,
            y_test: target.take(&test_idx)?,
        };

        debug!(
            "Train rows: {}, test rows: {}",
            split.x_train.height(),
            split.x_test.height()
        );
        info!("Train-test split completed.");
        Ok(split)
    }
}

/// Context holding the active splitting strategy.
pub struct DataSplitter {
    strategy: Box<dyn DataSplitterStrategy>,
}

static_assertions::assert_impl_all!(DataSplitter: Send, Sync);

impl DataSplitter {
    pub fn new(strategy: impl DataSplitterStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Replace the active strategy.
    pub fn set_strategy(&mut self, strategy: impl DataSplitterStrategy + 'static) {
        info!("Switching data splitting strategy.");
        self.strategy = Box::new(strategy);
    }

    pub fn split(&self, df: &DataFrame, target_column: &str) -> Result<SplitData> {
        info!("Splitting data using the selected strategy.");
        self.strategy.split_data(df, target_column)
    }
}
