//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they
//! can be:
//!
//! - used in-memory during narrative composition
//! - exported to JSON for downstream dashboards
//! - constructed directly in tests without io

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One row of the KPI table: cumulative users per product line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiRow {
    pub product_line: String,
    pub metric_name: String,
    pub value: u64,
}

/// One row of the 7-day peak table: tasks per product line, date and feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peak7dRow {
    pub product_line: String,
    pub date: NaiveDate,
    pub feature_id: u32,
    pub task_cnt: u64,
}

/// One row of the 48-hour peak table: tasks per product line and hour slot.
///
/// `slot_label` keeps the source `YYYY-MM-DD HH:00` text for display; `slot`
/// is the parsed timestamp used for sorting and day-truncated cutoff checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peak48hRow {
    pub product_line: String,
    pub slot: NaiveDateTime,
    pub slot_label: String,
    pub task_cnt: u64,
}

/// One row of the daily usage table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyUsageRow {
    pub product_line: String,
    pub date: NaiveDate,
    pub avg_daily_usage_per_user: f64,
    pub total_usage_count: u64,
    pub dau: u64,
}

/// One row of the new-users table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRow {
    pub product_line: String,
    pub date: NaiveDate,
    pub new_ai_users: u64,
}

/// Externally supplied observation window (preferred over derived dates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Per-region release date, used for the "real users only" cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub region: String,
    pub release_date: NaiveDate,
}

/// The full set of input tables for one narrative run.
///
/// Tables may be empty; downstream components must distinguish "zero
/// activity" from "no data available" via the aggregator's `Option` returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableSet {
    pub kpi: Vec<KpiRow>,
    pub peak_7d: Vec<Peak7dRow>,
    pub peak_48h: Vec<Peak48hRow>,
    pub daily_usage: Vec<DailyUsageRow>,
    pub new_users: Vec<NewUserRow>,
    pub observation: Option<ObservationPeriod>,
    pub releases: Vec<ReleaseInfo>,
}

/// A closed date interval `[start, end]`; may be degenerate (single date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Segment {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }
}

/// The first detected discontinuity in a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub date: NaiveDate,
    /// Index into the series this date corresponds to.
    pub index: usize,
}

/// Change-point detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Minimum number of leading points before a change point may be declared.
    pub min_before: usize,
    /// Ratio of a value to the leading mean that counts as a level shift.
    pub change_ratio: f64,
}

pub const DEFAULT_MIN_BEFORE: usize = 2;
pub const DEFAULT_CHANGE_RATIO: f64 = 1.4;

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            min_before: DEFAULT_MIN_BEFORE,
            change_ratio: DEFAULT_CHANGE_RATIO,
        }
    }
}

/// Which metric the representative series carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Dau,
    NewUsers,
}

impl SeriesKind {
    /// Human-readable label for narrative text and plot headers.
    pub fn display_name(self) -> &'static str {
        match self {
            SeriesKind::Dau => "daily active users",
            SeriesKind::NewUsers => "daily new users",
        }
    }
}

/// Named scalar statistics shared by the summary, findings and suggestions.
///
/// Absent fields mean "no data available", never zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeStats {
    pub total_users: u64,
    pub lead_product: Option<String>,
    pub lead_count: Option<u64>,
    /// Leading product's share of total users, rounded to one decimal.
    pub lead_pct: Option<f64>,
    pub dau_mean: Option<f64>,
    pub max_dau: Option<u64>,
    pub max_dau_date: Option<NaiveDate>,
    pub total_new: Option<u64>,
    pub zero_days: Option<usize>,
    pub new_peak: Option<u64>,
    pub peak_date: Option<NaiveDate>,
    pub peak_val: Option<u64>,
    pub busy_slot: Option<String>,
}

/// Setup / conflict / resolution sentences derived from the detector output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storyline {
    pub setup: String,
    pub conflict: String,
    pub resolution: String,
}

/// The structured narrative for one filtered table set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Narrative {
    pub summary: String,
    pub findings: Vec<String>,
    pub suggestions: Vec<String>,
    pub observation_period: Option<Segment>,
    pub storyline: Option<Storyline>,
    pub stats: NarrativeStats,
}

/// Scale classification of the user base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleStatus {
    NoData,
    Pilot,
    Growing,
    Established,
}

impl ScaleStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            ScaleStatus::NoData => "no-data",
            ScaleStatus::Pilot => "pilot",
            ScaleStatus::Growing => "growing",
            ScaleStatus::Established => "established",
        }
    }
}

/// Activity classification from DAU penetration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    NoData,
    HighPenetration,
    Medium,
    NeedsImprovement,
    Unclear,
}

impl ActivityStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            ActivityStatus::NoData => "no-data",
            ActivityStatus::HighPenetration => "high-penetration",
            ActivityStatus::Medium => "medium",
            ActivityStatus::NeedsImprovement => "needs-improvement",
            ActivityStatus::Unclear => "unclear",
        }
    }
}

/// Growth classification from new-user cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrowthStatus {
    NoData,
    None,
    Unstable,
    Stable,
}

impl GrowthStatus {
    pub fn display_name(self) -> &'static str {
        match self {
            GrowthStatus::NoData => "no-data",
            GrowthStatus::None => "none",
            GrowthStatus::Unstable => "unstable",
            GrowthStatus::Stable => "stable",
        }
    }
}

/// The three independent status classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTags {
    pub scale: ScaleStatus,
    pub activity: ActivityStatus,
    pub growth: GrowthStatus,
}

/// Narrative composer variant switches.
///
/// One configurable composer instead of parallel builder code paths: the
/// storyline can be disabled, and "real users only" restricts the tables to
/// post-release dates and sources the lead comparison from new-user counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NarrativeOptions {
    pub story: bool,
    pub real_users_only: bool,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults and the environment).
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub data_dir: PathBuf,
    /// Product lines to include, in selection order. Empty means "all".
    pub products: Vec<String>,
    /// Region whose release date defines the cutoff (default: earliest).
    pub region: Option<String>,
    pub options: NarrativeOptions,
    pub detector: DetectorParams,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
}
