//! Missing-value handling.
//!
//! This module provides the [`MissingValueHandlingStrategy`] contract, two
//! strategies, and the [`MissingValueHandler`] context that holds the active
//! strategy:
//! - [`DropMissingValuesStrategy`]: drop rows or columns below a non-null threshold
//! - [`FillMissingValuesStrategy`]: fill with mean, median, mode or a constant

mod drop;
mod fill;

pub use drop::{Axis, DropMissingValuesStrategy};
pub use fill::{FillMethod, FillMissingValuesStrategy, FillValue};

use crate::error::Result;
use polars::prelude::*;
use tracing::info;

/// Contract for strategies that deal with nulls in a dataset.
///
/// Implementations never modify the input; they return a new DataFrame.
pub trait MissingValueHandlingStrategy: Send + Sync {
    /// Handle the missing values of `df`.
    fn handle(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Context holding the active missing-value strategy.
///
/// # Example
///
/// ```rust,ignore
/// use prices_processing::missing::*;
///
/// let mut handler = MissingValueHandler::new(DropMissingValuesStrategy::new(Axis::Rows, Some(3)));
/// let cleaned = handler.handle_missing_values(&df)?;
///
/// handler.set_strategy(FillMissingValuesStrategy::new(FillMethod::Mean));
/// let filled = handler.handle_missing_values(&df)?;
/// ```
pub struct MissingValueHandler {
    strategy: Box<dyn MissingValueHandlingStrategy>,
}

static_assertions::assert_impl_all!(MissingValueHandler: Send, Sync);

impl MissingValueHandler {
    /// Create a handler with an initial strategy.
    pub fn new(strategy: impl MissingValueHandlingStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    /// Replace the active strategy.
    pub fn set_strategy(&mut self, strategy: impl MissingValueHandlingStrategy + 'static) {
        info!("Switching missing value handling strategy.");
        self.strategy = Box::new(strategy);
    }

    /// Handle missing values using the current strategy.
    pub fn handle_missing_values(&self, df: &DataFrame) -> Result<DataFrame> {
        info!("Handling missing values.");
        self.strategy.handle(df)
    }
}
