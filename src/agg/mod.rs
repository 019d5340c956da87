//! Row-to-scalar aggregation.
//!
//! Collapses filtered table rows into the scalars and series the narrative
//! composer needs. Every function returns an explicit absent value for an
//! empty input table so "zero activity" and "no data available" stay
//! distinguishable downstream.

use std::collections::BTreeMap;

use crate::domain::{
    DailyUsageRow, KpiRow, NewUserRow, Peak48hRow, Peak7dRow, Series,
};

/// Sum of KPI values across all rows.
pub fn kpi_total(rows: &[KpiRow]) -> u64 {
    rows.iter().map(|r| r.value).sum()
}

/// Sum of KPI values for one product line.
pub fn kpi_product_total(rows: &[KpiRow], product: &str) -> u64 {
    rows.iter()
        .filter(|r| r.product_line == product)
        .map(|r| r.value)
        .sum()
}

/// Sum of new users for one product line ("real users only" lead source).
pub fn new_user_product_total(rows: &[NewUserRow], product: &str) -> u64 {
    rows.iter()
        .filter(|r| r.product_line == product)
        .map(|r| r.new_ai_users)
        .sum()
}

/// Daily active users summed across product lines per date.
pub fn dau_series(rows: &[DailyUsageRow]) -> Option<Series> {
    if rows.is_empty() {
        return None;
    }
    let mut totals = BTreeMap::new();
    for r in rows {
        *totals.entry(r.date).or_insert(0.0) += r.dau as f64;
    }
    Some(Series::from_totals(totals))
}

/// New users summed across product lines per date.
pub fn new_user_series(rows: &[NewUserRow]) -> Option<Series> {
    if rows.is_empty() {
        return None;
    }
    let mut totals = BTreeMap::new();
    for r in rows {
        *totals.entry(r.date).or_insert(0.0) += r.new_ai_users as f64;
    }
    Some(Series::from_totals(totals))
}

/// 7-day task counts summed across product lines and features per date.
pub fn task_series_7d(rows: &[Peak7dRow]) -> Option<Series> {
    if rows.is_empty() {
        return None;
    }
    let mut totals = BTreeMap::new();
    for r in rows {
        *totals.entry(r.date).or_insert(0.0) += r.task_cnt as f64;
    }
    Some(Series::from_totals(totals))
}

/// The hour slot with the largest summed task count.
///
/// Absent when the table is empty or the grand total is 0. Ties resolve to
/// the chronologically first slot (the `BTreeMap` iterates slots in time
/// order, and only a strictly larger sum replaces the current best).
pub fn busy_slot(rows: &[Peak48hRow]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }

    let mut totals: BTreeMap<chrono::NaiveDateTime, (&str, u64)> = BTreeMap::new();
    for r in rows {
        let entry = totals.entry(r.slot).or_insert((r.slot_label.as_str(), 0));
        entry.1 += r.task_cnt;
    }

    let grand_total: u64 = totals.values().map(|&(_, cnt)| cnt).sum();
    if grand_total == 0 {
        return None;
    }

    let mut best: Option<(&str, u64)> = None;
    for &(label, cnt) in totals.values() {
        if best.map_or(true, |(_, b)| cnt > b) {
            best = Some((label, cnt));
        }
    }
    best.map(|(label, _)| label.to_string())
}
