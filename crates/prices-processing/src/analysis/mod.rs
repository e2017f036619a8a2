//! Exploratory analysis rendered as text.
//!
//! Nothing here modifies data. Every strategy writes to a caller-supplied
//! [`std::io::Write`] sink; the CLI passes stdout.

mod bivariate;
mod inspection;
mod missing;
mod multivariate;
pub(crate) mod render;
mod univariate;

pub use bivariate::{
    BivariateAnalysisStrategy, BivariateAnalyzer, CategoricalVsNumericalAnalysis,
    NumericalVsNumericalAnalysis,
};
pub use inspection::{
    DataInspectionStrategy, DataInspector, DataTypesInspectionStrategy,
    SummaryStatisticsInspectionStrategy, category_counts,
};
pub use missing::{MissingValuesAnalysis, SimpleMissingValuesAnalysis, missing_counts};
pub use multivariate::{MultivariateAnalysis, SimpleMultivariateAnalysis, correlation_matrix};
pub use univariate::{
    CategoricalUnivariateAnalysis, NumericalUnivariateAnalysis, UnivariateAnalysisStrategy,
    UnivariateAnalyzer,
};
