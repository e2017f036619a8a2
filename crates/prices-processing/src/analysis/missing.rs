//! Missing-value analysis.

use crate::error::Result;
use polars::prelude::*;
use std::io::Write;

use super::render::{CHART_WIDTH, heat_strip};

/// Template for missing-value analysis: identify, then visualize.
pub trait MissingValuesAnalysis {
    /// Run the full analysis.
    fn analyze(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        self.identify_missing_values(df, out)?;
        self.visualize_missing_values(df, out)
    }

    fn identify_missing_values(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()>;

    fn visualize_missing_values(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()>;
}

/// Lists columns with nulls and draws one heat strip per column.
#[derive(Debug, Clone, Default)]
pub struct SimpleMissingValuesAnalysis;

impl MissingValuesAnalysis for SimpleMissingValuesAnalysis {
    fn identify_missing_values(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "\nMissing Values Count by Column:")?;
        let missing = missing_counts(df);
        if missing.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for (name, count) in missing {
            writeln!(out, "  {name}: {count}")?;
        }
        Ok(())
    }

    fn visualize_missing_values(&self, df: &DataFrame, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "\nVisualizing Missing Values:")?;
        let name_width = df
            .get_column_names()
            .iter()
            .map(|n| n.chars().count())
            .max()
            .unwrap_or(0);

        for col in df.get_columns() {
            let is_null: Vec<bool> = (&col.is_null())
                .into_iter()
                .map(|v| v.unwrap_or(false))
                .collect();
            writeln!(
                out,
                "  {:<name_width$} |{}|",
                col.name().as_str(),
                heat_strip(&is_null, CHART_WIDTH)
            )?;
        }
        Ok(())
    }
}

/// `(column, null count)` for every column that has nulls, in frame order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .filter(|col| col.null_count() > 0)
        .map(|col| (col.name().to_string(), col.null_count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> DataFrame {
        df![
            "Lot Frontage" => [Some(80.0), None, None, Some(60.0)],
            "SalePrice" => [1.0, 2.0, 3.0, 4.0],
            "Alley" => [None, Some("Grvl"), None, None],
        ]
        .unwrap()
    }

    #[test]
    fn test_missing_counts() {
        assert_eq!(
            missing_counts(&sample()),
            vec![("Lot Frontage".to_string(), 2), ("Alley".to_string(), 3)]
        );
    }

    #[test]
    fn test_analyze_runs_both_phases() {
        let mut out = Vec::new();
        SimpleMissingValuesAnalysis
            .analyze(&sample(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Lot Frontage: 2"));
        assert!(!text.contains("SalePrice: "));
        assert!(text.contains("Visualizing Missing Values"));
        // One heat strip per column, complete columns render blank
        let strip = text.lines().find(|l| l.trim_start().starts_with("SalePrice")).unwrap();
        assert!(strip.ends_with("|    |"));
    }
}
