//! Aggregated time series.
//!
//! A `Series` is the unit the change-point detector and the storyline work
//! on: chronologically ordered, duplicate-free `(date, value)` pairs with
//! non-negative values. Construction goes through a `BTreeMap`, so ordering
//! and uniqueness hold by construction rather than by caller discipline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Segment;

/// One aggregated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Chronologically sorted, duplicate-free `(date, value)` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Build a series from per-date totals. Dates come out sorted and unique.
    pub fn from_totals(totals: BTreeMap<NaiveDate, f64>) -> Self {
        let points = totals
            .into_iter()
            .map(|(date, value)| SeriesPoint { date, value })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Full date range as a segment, absent for an empty series.
    pub fn full_range(&self) -> Option<Segment> {
        Some(Segment::new(self.first_date()?, self.last_date()?))
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Arithmetic mean, absent for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.total() / self.points.len() as f64)
    }

    /// Mean over the index range `[lo, hi)`, absent when the range is empty.
    pub fn mean_range(&self, lo: usize, hi: usize) -> Option<f64> {
        let slice = self.points.get(lo..hi)?;
        if slice.is_empty() {
            return None;
        }
        Some(slice.iter().map(|p| p.value).sum::<f64>() / slice.len() as f64)
    }

    /// The maximum value and the first date in chronological order achieving
    /// it. Absent for an empty series.
    pub fn peak(&self) -> Option<SeriesPoint> {
        let mut best: Option<SeriesPoint> = None;
        for p in &self.points {
            // Strict comparison keeps the earliest date on ties.
            if best.map_or(true, |b| p.value > b.value) {
                best = Some(*p);
            }
        }
        best
    }

    /// Number of dates whose aggregated value equals exactly 0.
    ///
    /// A missing date is not a zero day.
    pub fn zero_count(&self) -> usize {
        self.points.iter().filter(|p| p.value == 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(pairs: &[(&str, f64)]) -> Series {
        let totals: BTreeMap<NaiveDate, f64> =
            pairs.iter().map(|&(s, v)| (d(s), v)).collect();
        Series::from_totals(totals)
    }

    #[test]
    fn from_totals_sorts_and_dedups() {
        let mut totals = BTreeMap::new();
        totals.insert(d("2026-02-03"), 3.0);
        totals.insert(d("2026-02-01"), 1.0);
        totals.insert(d("2026-02-02"), 2.0);

        let s = Series::from_totals(totals);
        let dates: Vec<NaiveDate> = s.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d("2026-02-01"), d("2026-02-02"), d("2026-02-03")]);
    }

    #[test]
    fn peak_takes_first_date_on_tie() {
        let s = series(&[("2026-02-01", 5.0), ("2026-02-02", 5.0), ("2026-02-03", 1.0)]);
        let p = s.peak().unwrap();
        assert_eq!(p.date, d("2026-02-01"));
        assert_eq!(p.value, 5.0);
    }

    #[test]
    fn zero_count_matches_exact_zeros_only() {
        let s = series(&[
            ("2026-02-01", 0.0),
            ("2026-02-02", 0.0),
            ("2026-02-03", 3.0),
            ("2026-02-04", 0.0),
            ("2026-02-05", 5.0),
        ]);
        assert_eq!(s.zero_count(), 3);
        assert_eq!(s.total(), 8.0);
        assert_eq!(s.peak().unwrap().value, 5.0);
    }

    #[test]
    fn mean_absent_for_empty() {
        let s = series(&[]);
        assert!(s.mean().is_none());
        assert!(s.full_range().is_none());
        assert!(s.peak().is_none());
    }

    #[test]
    fn mean_range_is_half_open() {
        let s = series(&[("2026-02-01", 2.0), ("2026-02-02", 4.0), ("2026-02-03", 9.0)]);
        assert_eq!(s.mean_range(0, 2), Some(3.0));
        assert_eq!(s.mean_range(2, 3), Some(9.0));
        assert!(s.mean_range(2, 2).is_none());
        assert!(s.mean_range(0, 4).is_none());
    }
}
