//! Two-feature analysis.

use crate::error::Result;
use crate::stats::{self, FiveNumberSummary};
use crate::utils::{numeric_values, require_column, require_numeric_column, string_values};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::info;

use super::render::{self, CHART_WIDTH, format_value};

/// Contract for two-feature analysis strategies.
pub trait BivariateAnalysisStrategy: Send + Sync {
    fn analyze(
        &self,
        df: &DataFrame,
        feature1: &str,
        feature2: &str,
        out: &mut dyn Write,
    ) -> Result<()>;
}

/// Scatter plot and Pearson correlation of two numeric features.
#[derive(Debug, Clone, Default)]
pub struct NumericalVsNumericalAnalysis;

impl BivariateAnalysisStrategy for NumericalVsNumericalAnalysis {
    fn analyze(
        &self,
        df: &DataFrame,
        feature1: &str,
        feature2: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        let x = numeric_values(require_numeric_column(df, feature1)?)?;
        let y = numeric_values(require_numeric_column(df, feature2)?)?;
        let pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(y.iter())
            .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
            .collect();

        writeln!(out, "\nScatter Plot of {feature1} vs {feature2}")?;
        render::scatter(out, &pairs, CHART_WIDTH, CHART_WIDTH / 3)?;
        let r = stats::pearson(&x, &y)
            .map(|r| format!("{r:.3}"))
            .unwrap_or_else(|| "-".to_string());
        writeln!(out, "  pairs={} pearson_r={}", pairs.len(), r)?;
        Ok(())
    }
}

/// Box statistics of a numeric feature per category of another.
#[derive(Debug, Clone, Default)]
pub struct CategoricalVsNumericalAnalysis;

impl BivariateAnalysisStrategy for CategoricalVsNumericalAnalysis {
    fn analyze(
        &self,
        df: &DataFrame,
        feature1: &str,
        feature2: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        let categories = string_values(require_column(df, feature1)?)?;
        let values = numeric_values(require_numeric_column(df, feature2)?)?;

        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for (category, value) in categories.into_iter().zip(values) {
            if let (Some(category), Some(value)) = (category, value) {
                groups.entry(category).or_default().push(value);
            }
        }

        writeln!(out, "\nBox Plot of {feature1} vs {feature2}")?;
        let label_width = groups.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        for (category, group) in &groups {
            if let Some(summary) = FiveNumberSummary::from_values(group)? {
                writeln!(
                    out,
                    "  {:<label_width$} n={:<5} min={} q1={} median={} q3={} max={}",
                    category,
                    group.len(),
                    format_value(summary.min),
                    format_value(summary.q1),
                    format_value(summary.median),
                    format_value(summary.q3),
                    format_value(summary.max),
                )?;
            }
        }
        Ok(())
    }
}

/// Context holding the active bivariate strategy.
pub struct BivariateAnalyzer {
    strategy: Box<dyn BivariateAnalysisStrategy>,
}

static_assertions::assert_impl_all!(BivariateAnalyzer: Send, Sync);

impl BivariateAnalyzer {
    pub fn new(strategy: impl BivariateAnalysisStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn set_strategy(&mut self, strategy: impl BivariateAnalysisStrategy + 'static) {
        info!("Switching bivariate analysis strategy.");
        self.strategy = Box::new(strategy);
    }

    pub fn execute_strategy(
        &self,
        df: &DataFrame,
        feature1: &str,
        feature2: &str,
        out: &mut dyn Write,
    ) -> Result<()> {
        self.strategy.analyze(df, feature1, feature2, out)
    }
}
