//! Plain-text charts.

use crate::stats::FiveNumberSummary;
use std::io::{self, Write};

/// Width in characters of bars and plot areas.
pub const CHART_WIDTH: usize = 40;

/// Shading from empty to full, used by heat strips and heatmaps.
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// Compact number formatting for chart labels.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && (abs >= 1e7 || abs < 1e-3) {
        format!("{value:.3e}")
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.3}")
    }
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (count as f64 / max as f64 * width as f64).round() as usize;
    "#".repeat(len.max(usize::from(count > 0)))
}

/// Bin counts over `[min, max]`. The last bin is closed on the right.
pub fn bin_counts(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let bins = bins.max(1);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if values.is_empty() {
        return Vec::new();
    }
    if min == max {
        return vec![(min, max, values.len())];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + width * i as f64;
            (lo, lo + width, count)
        })
        .collect()
}

/// Horizontal histogram, one line per bin.
pub fn histogram(out: &mut dyn Write, values: &[f64], bins: usize) -> io::Result<()> {
    let counts = bin_counts(values, bins);
    let max = counts.iter().map(|(_, _, c)| *c).max().unwrap_or(0);
    for (lo, hi, count) in counts {
        writeln!(
            out,
            "  [{:>12}, {:>12}] {:>6} {}",
            format_value(lo),
            format_value(hi),
            count,
            bar(count, max, CHART_WIDTH)
        )?;
    }
    Ok(())
}

/// Horizontal bar chart of labelled counts.
pub fn bar_chart(out: &mut dyn Write, counts: &[(String, usize)]) -> io::Result<()> {
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = counts.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    for (label, count) in counts {
        writeln!(
            out,
            "  {:<label_width$} {:>6} {}",
            label,
            count,
            bar(*count, max, CHART_WIDTH)
        )?;
    }
    Ok(())
}

/// Box-plot summary: quartiles, whiskers, fences and outlier count.
pub fn box_plot(out: &mut dyn Write, summary: &FiveNumberSummary, values: &[f64]) -> io::Result<()> {
    let (lower, upper) = summary.fences();
    let inside: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| *v >= lower && *v <= upper)
        .collect();
    let whisker_lo = inside.iter().copied().fold(summary.q1, f64::min);
    let whisker_hi = inside.iter().copied().fold(summary.q3, f64::max);
    let outliers = values.len() - inside.len();

    let span = summary.max - summary.min;
    let pos = |v: f64| -> usize {
        if span == 0.0 {
            0
        } else {
            (((v - summary.min) / span) * (CHART_WIDTH - 1) as f64).round() as usize
        }
    };

    let mut line = vec![' '; CHART_WIDTH];
    for cell in line.iter_mut().take(pos(whisker_hi) + 1).skip(pos(whisker_lo)) {
        *cell = '-';
    }
    for cell in line.iter_mut().take(pos(summary.q3) + 1).skip(pos(summary.q1)) {
        *cell = '=';
    }
    line[pos(whisker_lo)] = '|';
    line[pos(whisker_hi)] = '|';
    line[pos(summary.median)] = 'M';
    for &value in values.iter().filter(|v| **v < lower || **v > upper) {
        line[pos(value)] = 'o';
    }

    writeln!(out, "  {}", line.into_iter().collect::<String>())?;
    writeln!(
        out,
        "  min={} q1={} median={} q3={} max={}",
        format_value(summary.min),
        format_value(summary.q1),
        format_value(summary.median),
        format_value(summary.q3),
        format_value(summary.max)
    )?;
    writeln!(
        out,
        "  fences=[{}, {}] outliers: {}",
        format_value(lower),
        format_value(upper),
        outliers
    )
}

/// Scatter plot of paired values on a `width` x `height` grid.
pub fn scatter(
    out: &mut dyn Write,
    pairs: &[(f64, f64)],
    width: usize,
    height: usize,
) -> io::Result<()> {
    if pairs.is_empty() || width == 0 || height == 0 {
        return writeln!(out, "  (no complete pairs)");
    }

    let (x_min, x_max) = bounds(pairs.iter().map(|p| p.0));
    let (y_min, y_max) = bounds(pairs.iter().map(|p| p.1));
    let cell = |v: f64, min: f64, max: f64, cells: usize| -> usize {
        if max == min {
            0
        } else {
            (((v - min) / (max - min)) * (cells - 1) as f64).round() as usize
        }
    };

    let mut grid = vec![vec![0usize; width]; height];
    for &(x, y) in pairs {
        let col = cell(x, x_min, x_max, width);
        let row = height - 1 - cell(y, y_min, y_max, height);
        grid[row][col] += 1;
    }

    writeln!(out, "  {:>10} +{}", format_value(y_max), "-".repeat(width))?;
    for row in grid {
        let line: String = row
            .into_iter()
            .map(|n| match n {
                0 => ' ',
                1 => '.',
                2..=4 => 'o',
                _ => '@',
            })
            .collect();
        writeln!(out, "  {:>10} |{}", "", line)?;
    }
    writeln!(out, "  {:>10} +{}", format_value(y_min), "-".repeat(width))?;
    writeln!(
        out,
        "  {:>10}  {:<w$}{}",
        "",
        format_value(x_min),
        format_value(x_max),
        w = width.saturating_sub(format_value(x_max).len())
    )
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Shade for a fraction in `[0, 1]`.
pub fn shade(fraction: f64) -> char {
    let idx = (fraction.clamp(0.0, 1.0) * (SHADES.len() - 1) as f64).round() as usize;
    SHADES[idx]
}

/// Compress a null mask into a strip of `width` shaded cells.
///
/// Each cell covers a run of rows and is shaded by the share of nulls in it.
pub fn heat_strip(is_null: &[bool], width: usize) -> String {
    if is_null.is_empty() || width == 0 {
        return String::new();
    }
    let cells = width.min(is_null.len());
    (0..cells)
        .map(|cell| {
            let start = cell * is_null.len() / cells;
            let end = ((cell + 1) * is_null.len() / cells).max(start + 1);
            let nulls = is_null[start..end].iter().filter(|&&n| n).count();
            shade(nulls as f64 / (end - start) as f64)
        })
        .collect()
}
