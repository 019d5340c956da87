//! ASCII plotting for terminal output.
//!
//! Intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - aggregated observations: `o`
//! - the detected change point: `X`

use crate::domain::{ChangePoint, Series, SeriesKind};

/// Render the representative series with the change point highlighted.
pub fn render_series_plot(
    series: &Series,
    change: Option<&ChangePoint>,
    kind: SeriesKind,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points = series.points();
    if points.is_empty() {
        return "(no data to plot)\n".to_string();
    }

    let (y_min, y_max) = pad_range(
        points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min),
        points
            .iter()
            .map(|p| p.value)
            .fold(f64::NEG_INFINITY, f64::max),
    );

    let mut grid = vec![vec![' '; width]; height];
    for (i, p) in points.iter().enumerate() {
        let x = map_x(i, points.len(), width);
        let y = map_y(p.value, y_min, y_max, height);
        let ch = if change.is_some_and(|cp| cp.index == i) {
            'X'
        } else {
            'o'
        };
        grid[y][x] = ch;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} | {} .. {} | y=[{y_min:.1}, {y_max:.1}]\n",
        kind.display_name(),
        points[0].date,
        points[points.len() - 1].date,
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn map_x(index: usize, n: usize, width: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let u = index as f64 / (n as f64 - 1.0);
    ((u * (width as f64 - 1.0)).round() as usize).min(width - 1)
}

fn map_y(value: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let span = y_max - y_min;
    let u = if span > 0.0 { (value - y_min) / span } else { 0.5 };
    let row = ((1.0 - u) * (height as f64 - 1.0)).round() as usize;
    row.min(height - 1)
}

fn pad_range(y_min: f64, y_max: f64) -> (f64, f64) {
    if !(y_min.is_finite() && y_max.is_finite()) {
        return (0.0, 1.0);
    }
    let pad = ((y_max - y_min) * 0.05).max(0.5);
    ((y_min - pad).max(0.0), y_max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn series(pairs: &[(&str, f64)]) -> Series {
        let totals: BTreeMap<NaiveDate, f64> = pairs
            .iter()
            .map(|&(s, v)| (NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap(), v))
            .collect();
        Series::from_totals(totals)
    }

    #[test]
    fn renders_fixed_grid_with_change_marker() {
        let s = series(&[
            ("2026-02-01", 2.0),
            ("2026-02-02", 2.0),
            ("2026-02-03", 2.0),
            ("2026-02-04", 10.0),
        ]);
        let cp = ChangePoint {
            date: NaiveDate::parse_from_str("2026-02-04", "%Y-%m-%d").unwrap(),
            index: 3,
        };

        let out = render_series_plot(&s, Some(&cp), SeriesKind::Dau, 40, 10);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[0].starts_with("Plot: daily active users"));
        assert_eq!(out.matches('o').count(), 3);
        assert_eq!(out.matches('X').count(), 1);
    }

    #[test]
    fn output_is_deterministic() {
        let s = series(&[("2026-02-01", 1.0), ("2026-02-02", 3.0)]);
        let a = render_series_plot(&s, None, SeriesKind::NewUsers, 30, 8);
        let b = render_series_plot(&s, None, SeriesKind::NewUsers, 30, 8);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_series_has_a_placeholder() {
        let s = series(&[]);
        assert_eq!(
            render_series_plot(&s, None, SeriesKind::Dau, 30, 8),
            "(no data to plot)\n"
        );
    }
}
