//! Multi-feature analysis: correlation heatmap and pair grid.

use crate::error::Result;
use crate::stats;
use crate::utils::{numeric_column_names, numeric_values};
use polars::prelude::*;
use std::io::Write;

use super::render::{self, format_value, shade};

/// Template for multivariate analysis: heatmap, then pair grid.
pub trait MultivariateAnalysis {
    fn analyze(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        self.generate_correlation_heatmap(df, out)?;
        self.generate_pairplot(df, out)
    }

    fn generate_correlation_heatmap(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()>;

    fn generate_pairplot(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()>;
}

/// Works on the numeric columns of the frame it is given.
#[derive(Debug, Clone, Default)]
pub struct SimpleMultivariateAnalysis;

/// Pairwise Pearson correlations of the numeric columns, with their names.
///
/// Pairs without enough data (or a constant side) are `None`.
pub fn correlation_matrix(df: &DataFrame) -> Result<(Vec<String>, Vec<Vec<Option<f64>>>)> {
    let names = numeric_column_names(df);
    let columns = names
        .iter()
        .map(|name| Ok(numeric_values(df.column(name)?.as_materialized_series())?))
        .collect::<Result<Vec<_>>>()?;

    let matrix = columns
        .iter()
        .map(|x| columns.iter().map(|y| stats::pearson(x, y)).collect())
        .collect();
    Ok((names, matrix))
}

impl MultivariateAnalysis for SimpleMultivariateAnalysis {
    fn generate_correlation_heatmap(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        let (names, matrix) = correlation_matrix(df)?;
        let label_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);

        writeln!(out, "\nCorrelation Heatmap")?;
        write!(out, "  {:<label_width$}", "")?;
        for idx in 0..names.len() {
            write!(out, " {:>7}", format!("[{idx}]"))?;
        }
        writeln!(out)?;

        for (idx, (name, row)) in names.iter().zip(&matrix).enumerate() {
            write!(out, "  {name:<label_width$}")?;
            for r in row {
                match r {
                    Some(r) => write!(out, " {}{:>6.2}", shade(r.abs()), r)?,
                    None => write!(out, " {:>7}", "-")?,
                }
            }
            writeln!(out, "  [{idx}]")?;
        }
        Ok(())
    }

    fn generate_pairplot(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        let names = numeric_column_names(df);
        writeln!(out, "\nPair Plot of Selected Features")?;

        for (i, x_name) in names.iter().enumerate() {
            let x = numeric_values(df.column(x_name)?.as_materialized_series())?;
            let present: Vec<f64> = x.iter().flatten().copied().collect();
            writeln!(out, "\n{x_name}")?;
            render::histogram(out, &present, 10)?;

            for y_name in names.iter().skip(i + 1) {
                let y = numeric_values(df.column(y_name)?.as_materialized_series())?;
                let pairs: Vec<(f64, f64)> = x
                    .iter()
                    .zip(y.iter())
                    .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                    .collect();
                writeln!(out, "\n{x_name} vs {y_name}")?;
                render::scatter(out, &pairs, 24, 8)?;
                if let Some(r) = stats::pearson(&x, &y) {
                    writeln!(out, "  r={}", format_value(r))?;
                }
            }
        }
        Ok(())
    }
}
