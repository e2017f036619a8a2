//! Basic data inspection: column types and summary statistics.

use crate::error::Result;
use crate::stats;
use crate::utils::{DtypeCategory, get_dtype_category, is_numeric_dtype, string_values};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::info;

use super::render::format_value;

/// Contract for inspection strategies.
pub trait DataInspectionStrategy: Send + Sync {
    fn inspect(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()>;
}

/// Prints each column's dtype and non-null count.
#[derive(Debug, Clone, Default)]
pub struct DataTypesInspectionStrategy;

impl DataInspectionStrategy for DataTypesInspectionStrategy {
    fn inspect(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        let name_width = df
            .get_column_names()
            .iter()
            .map(|n| n.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);

        writeln!(out, "\nData Types and Non-Null Counts:")?;
        writeln!(out, "Rows: {}, Columns: {}", df.height(), df.width())?;
        writeln!(out, "  {:<name_width$} {:>14}  Dtype", "Column", "Non-Null Count")?;
        for col in df.get_columns() {
            writeln!(
                out,
                "  {:<name_width$} {:>14}  {}",
                col.name().as_str(),
                col.len() - col.null_count(),
                col.dtype()
            )?;
        }
        Ok(())
    }
}

/// Describes numeric columns (count, mean, std, min, quartiles, max) and
/// categorical columns (count, unique, top, freq).
#[derive(Debug, Clone, Default)]
pub struct SummaryStatisticsInspectionStrategy;

impl SummaryStatisticsInspectionStrategy {
    fn numeric_summary(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "\nSummary Statistics (Numerical Features):")?;
        writeln!(
            out,
            "  {:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;

        for col in df.get_columns() {
            if !is_numeric_dtype(col.dtype()) {
                continue;
            }
            let ca = stats::float_chunked(col.as_materialized_series())?;
            let cell = |v: Option<f64>| v.map(format_value).unwrap_or_else(|| "NaN".to_string());

            writeln!(
                out,
                "  {:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                col.name().as_str(),
                ca.len() - ca.null_count(),
                cell(ca.mean()),
                cell(ca.std(1)),
                cell(ca.min()),
                cell(ca.quantile(0.25, QuantileMethod::Linear)?),
                cell(ca.quantile(0.5, QuantileMethod::Linear)?),
                cell(ca.quantile(0.75, QuantileMethod::Linear)?),
                cell(ca.max()),
            )?;
        }
        Ok(())
    }

    fn categorical_summary(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "\nSummary Statistics (Categorical Features):")?;
        writeln!(
            out,
            "  {:<20} {:>8} {:>8} {:>20} {:>8}",
            "", "count", "unique", "top", "freq"
        )?;

        for col in df.get_columns() {
            if get_dtype_category(col.dtype()) != DtypeCategory::String {
                continue;
            }
            let counts = category_counts(col.as_materialized_series())?;
            let count: usize = counts.iter().map(|(_, c)| c).sum();
            let (top, freq) = counts
                .first()
                .map(|(label, freq)| (label.as_str(), *freq))
                .unwrap_or(("", 0));

            writeln!(
                out,
                "  {:<20} {:>8} {:>8} {:>20} {:>8}",
                col.name().as_str(),
                count,
                counts.len(),
                top,
                freq
            )?;
        }
        Ok(())
    }
}

impl DataInspectionStrategy for SummaryStatisticsInspectionStrategy {
    fn inspect(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        self.numeric_summary(df, out)?;
        self.categorical_summary(df, out)
    }
}

/// Non-null value counts, most frequent first, ties in value order.
pub fn category_counts(series: &Series) -> PolarsResult<Vec<(String, usize)>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in string_values(series)?.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    // Stable sort keeps the value order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

/// Context holding the active inspection strategy.
pub struct DataInspector {
    strategy: Box<dyn DataInspectionStrategy>,
}

static_assertions::assert_impl_all!(DataInspector: Send, Sync);

impl DataInspector {
    pub fn new(strategy: impl DataInspectionStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn set_strategy(&mut self, strategy: impl DataInspectionStrategy + 'static) {
        info!("Switching data inspection strategy.");
        self.strategy = Box::new(strategy);
    }

    pub fn execute_strategy(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        self.strategy.inspect(df, out)
    }
}
