//! Drop rows or columns that contain missing values.

use super::MissingValueHandlingStrategy;
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which dimension a drop applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Drop rows (axis 0)
    #[default]
    Rows,
    /// Drop columns (axis 1)
    Columns,
}

/// Drops rows or columns with too few non-null values.
///
/// With `thresh = Some(n)` a row (or column) survives when it has at least
/// `n` non-null values. With `thresh = None` any null causes a drop.
#[derive(Debug, Clone, Default)]
pub struct DropMissingValuesStrategy {
    axis: Axis,
    thresh: Option<usize>,
}

impl DropMissingValuesStrategy {
    pub fn new(axis: Axis, thresh: Option<usize>) -> Self {
        Self { axis, thresh }
    }

    fn keeps(&self, non_null: usize, total: usize) -> bool {
        match self.thresh {
            Some(thresh) => non_null >= thresh,
            None => non_null == total,
        }
    }

    fn drop_rows(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut non_null = vec![0usize; df.height()];
        for col in df.get_columns() {
            let mask = col.is_null();
            for (idx, is_null) in (&mask).into_iter().enumerate() {
                if !is_null.unwrap_or(false) {
                    non_null[idx] += 1;
                }
            }
        }

        let keep: Vec<bool> = non_null
            .iter()
            .map(|&count| self.keeps(count, df.width()))
            .collect();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    fn drop_columns(&self, df: &DataFrame) -> Result<DataFrame> {
        let kept: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|col| self.keeps(col.len() - col.null_count(), col.len()))
            .map(|col| col.name().to_string())
            .collect();
        Ok(df.select(kept)?)
    }
}

impl MissingValueHandlingStrategy for DropMissingValuesStrategy {
    fn handle(&self, df: &DataFrame) -> Result<DataFrame> {
        info!(
            "Dropping missing values with axis={:?}, thresh={:?}",
            self.axis, self.thresh
        );

        let cleaned = match self.axis {
            Axis::Rows => self.drop_rows(df)?,
            Axis::Columns => self.drop_columns(df)?,
        };

        debug!("Shape {:?} -> {:?}", df.shape(), cleaned.shape());
        info!("Missing values have been dropped successfully");
        Ok(cleaned)
    }
}
