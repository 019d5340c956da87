//! Table filtering.
//!
//! Pure row-subset operations: restrict tables to selected product lines
//! and, when "real users only" is active, to dates on or after a release
//! cutoff. An empty selection yields empty tables, which downstream
//! components treat as "no data" rather than an error.

use chrono::NaiveDate;

use crate::domain::{ReleaseInfo, TableSet};

/// Distinct product lines in KPI-table order (the selection universe).
pub fn product_options(tables: &TableSet) -> Vec<String> {
    let mut seen = Vec::new();
    for row in &tables.kpi {
        if !seen.iter().any(|p| p == &row.product_line) {
            seen.push(row.product_line.clone());
        }
    }
    seen
}

/// Keep only rows whose product line is in `products`.
///
/// The config tables (observation period, releases) pass through untouched.
pub fn select_products(tables: &TableSet, products: &[String]) -> TableSet {
    let keep = |p: &str| products.iter().any(|sel| sel == p);
    TableSet {
        kpi: tables
            .kpi
            .iter()
            .filter(|r| keep(&r.product_line))
            .cloned()
            .collect(),
        peak_7d: tables
            .peak_7d
            .iter()
            .filter(|r| keep(&r.product_line))
            .cloned()
            .collect(),
        peak_48h: tables
            .peak_48h
            .iter()
            .filter(|r| keep(&r.product_line))
            .cloned()
            .collect(),
        daily_usage: tables
            .daily_usage
            .iter()
            .filter(|r| keep(&r.product_line))
            .cloned()
            .collect(),
        new_users: tables
            .new_users
            .iter()
            .filter(|r| keep(&r.product_line))
            .cloned()
            .collect(),
        observation: tables.observation,
        releases: tables.releases.clone(),
    }
}

/// Keep only dated rows on or after `cutoff`.
///
/// Hour slots are truncated to their day before comparing. KPI rows carry no
/// date and pass through unchanged.
pub fn apply_release_cutoff(tables: &TableSet, cutoff: NaiveDate) -> TableSet {
    TableSet {
        kpi: tables.kpi.clone(),
        peak_7d: tables
            .peak_7d
            .iter()
            .filter(|r| r.date >= cutoff)
            .cloned()
            .collect(),
        peak_48h: tables
            .peak_48h
            .iter()
            .filter(|r| r.slot.date() >= cutoff)
            .cloned()
            .collect(),
        daily_usage: tables
            .daily_usage
            .iter()
            .filter(|r| r.date >= cutoff)
            .cloned()
            .collect(),
        new_users: tables
            .new_users
            .iter()
            .filter(|r| r.date >= cutoff)
            .cloned()
            .collect(),
        observation: tables.observation,
        releases: tables.releases.clone(),
    }
}

/// The cutoff date for "real users only" filtering.
///
/// A named region selects that region's release date; otherwise the earliest
/// configured release date applies. No configured releases means no cutoff.
pub fn resolve_cutoff(releases: &[ReleaseInfo], region: Option<&str>) -> Option<NaiveDate> {
    if let Some(name) = region {
        return releases
            .iter()
            .find(|r| r.region == name)
            .map(|r| r.release_date);
    }
    releases.iter().map(|r| r.release_date).min()
}
