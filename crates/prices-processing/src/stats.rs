//! Descriptive statistics over numeric columns.
//!
//! Aggregations delegate to Polars (`mean`, `std(ddof)`, `median`,
//! linear-interpolated `quantile`). Skewness and Pearson correlation are
//! computed over extracted values.

use polars::prelude::*;

/// Cast a numeric Series to a `Float64Chunked`.
pub fn float_chunked(series: &Series) -> PolarsResult<Float64Chunked> {
    Ok(series.cast(&DataType::Float64)?.f64()?.clone())
}

/// Arithmetic mean of the non-null values.
pub fn mean(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(float_chunked(series)?.mean())
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// `ddof = 0` is the population deviation used by the scalers, `ddof = 1`
/// the sample deviation used by z-score detection.
pub fn std_dev(series: &Series, ddof: u8) -> PolarsResult<Option<f64>> {
    Ok(float_chunked(series)?.std(ddof))
}

/// Median of the non-null values.
pub fn median(series: &Series) -> PolarsResult<Option<f64>> {
    Ok(float_chunked(series)?.median())
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(series: &Series, q: f64) -> PolarsResult<Option<f64>> {
    float_chunked(series)?.quantile(q, QuantileMethod::Linear)
}

/// Sample skewness (adjusted Fisher-Pearson). `None` below three values or
/// for a constant series.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len() as f64;
    if values.len() < 3 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n;
    let m2 = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let m3 = values.iter().map(|v| (v - mean).powi(3)).sum::<f64>() / n;
    if m2 == 0.0 {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    Some(g1 * (n * (n - 1.0)).sqrt() / (n - 2.0))
}

/// Pearson correlation over pairs where both sides are present.
///
/// Returns `None` when fewer than two complete pairs exist or either side
/// is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Five-number summary used by box plots and IQR fences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// Compute the summary over the non-null values, `None` when there are none.
    pub fn from_series(series: &Series) -> PolarsResult<Option<Self>> {
        Self::from_chunked(&float_chunked(series)?)
    }

    pub fn from_chunked(ca: &Float64Chunked) -> PolarsResult<Option<Self>> {
        let (Some(min), Some(max)) = (ca.min(), ca.max()) else {
            return Ok(None);
        };
        let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
        let median = ca.median();
        let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;

        Ok(match (q1, median, q3) {
            (Some(q1), Some(median), Some(q3)) => Some(Self {
                min,
                q1,
                median,
                q3,
                max,
            }),
            _ => None,
        })
    }

    /// Compute the summary over extracted values.
    pub fn from_values(values: &[f64]) -> PolarsResult<Option<Self>> {
        Self::from_series(&Series::new("values".into(), values))
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Tukey fences `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`.
    pub fn fences(&self) -> (f64, f64) {
        (self.q1 - 1.5 * self.iqr(), self.q3 + 1.5 * self.iqr())
    }
}
