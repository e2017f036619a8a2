//! Single-feature analysis.

use crate::error::Result;
use crate::stats;
use crate::utils::{non_null_numeric_values, require_column, require_numeric_column};
use polars::prelude::*;
use std::io::Write;
use tracing::info;

use super::inspection::category_counts;
use super::render::{self, format_value};

/// Contract for single-feature analysis strategies.
pub trait UnivariateAnalysisStrategy: Send + Sync {
    fn analyze(&self, df: &DataFrame, feature: &str, out: &mut dyn Write) -> Result<()>;
}

/// Histogram of a numeric feature with a distribution-shape summary.
#[derive(Debug, Clone)]
pub struct NumericalUnivariateAnalysis {
    bins: usize,
}

impl NumericalUnivariateAnalysis {
    pub fn new(bins: usize) -> Self {
        Self { bins: bins.max(1) }
    }
}

impl Default for NumericalUnivariateAnalysis {
    fn default() -> Self {
        Self::new(30)
    }
}

impl UnivariateAnalysisStrategy for NumericalUnivariateAnalysis {
    fn analyze(&self, df: &DataFrame, feature: &str, out: &mut dyn Write) -> Result<()> {
        let series = require_numeric_column(df, feature)?;
        let values = non_null_numeric_values(series)?;
        let cell = |v: Option<f64>| v.map(format_value).unwrap_or_else(|| "-".to_string());

        writeln!(out, "\nHistogram for {feature}")?;
        render::histogram(out, &values, self.bins)?;
        writeln!(
            out,
            "  n={} mean={} std={} median={} skew={}",
            values.len(),
            cell(stats::mean(series)?),
            cell(stats::std_dev(series, 1)?),
            cell(stats::median(series)?),
            cell(stats::skewness(&values)),
        )?;
        Ok(())
    }
}

/// Count of each category, most frequent first.
#[derive(Debug, Clone, Default)]
pub struct CategoricalUnivariateAnalysis;

impl UnivariateAnalysisStrategy for CategoricalUnivariateAnalysis {
    fn analyze(&self, df: &DataFrame, feature: &str, out: &mut dyn Write) -> Result<()> {
        let counts = category_counts(require_column(df, feature)?)?;
        writeln!(out, "\nCountplot for {feature}")?;
        render::bar_chart(out, &counts)?;
        Ok(())
    }
}

/// Context holding the active univariate strategy.
pub struct UnivariateAnalyzer {
    strategy: Box<dyn UnivariateAnalysisStrategy>,
}

static_assertions::assert_impl_all!(UnivariateAnalyzer: Send, Sync);

impl UnivariateAnalyzer {
    pub fn new(strategy: impl UnivariateAnalysisStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn set_strategy(&mut self, strategy: impl UnivariateAnalysisStrategy + 'static) {
        info!("Switching univariate analysis strategy.");
        self.strategy = Box::new(strategy);
    }

    pub fn execute_analysis(&self, df: &DataFrame, feature: &str, out: &mut dyn Write) -> Result<()> {
        self.strategy.analyze(df, feature, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreprocessingError;

    fn sample() -> DataFrame {
        df![
            "SalePrice" => [120_000.0, 135_000.0, 150_000.0, 410_000.0],
            "Neighborhood" => ["NAmes", "OldTown", "NAmes", "NridgHt"],
        ]
        .unwrap()
    }

    #[test]
    fn test_numerical_histogram() {
        let mut out = Vec::new();
        UnivariateAnalyzer::new(NumericalUnivariateAnalysis::new(4))
            .execute_analysis(&sample(), "SalePrice", &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Histogram for SalePrice"));
        let bins = text.lines().filter(|l| l.trim_start().starts_with('[')).count();
        assert_eq!(bins, 4);
        assert!(text.contains("n=4"));
    }

    #[test]
    fn test_categorical_counts() {
        let mut analyzer = UnivariateAnalyzer::new(NumericalUnivariateAnalysis::default());
        analyzer.set_strategy(CategoricalUnivariateAnalysis);

        let mut out = Vec::new();
        analyzer
            .execute_analysis(&sample(), "Neighborhood", &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        let first = text.lines().nth(2).unwrap();
        assert!(first.contains("NAmes"));
        assert!(first.contains(" 2 "));
    }

    #[test]
    fn test_numerical_rejects_text() {
        let err = NumericalUnivariateAnalysis::default()
            .analyze(&sample(), "Neighborhood", &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, PreprocessingError::InvalidColumnType { .. }));
    }
}
