//! Narrative composition.
//!
//! Turns aggregated statistics and the detector's segmentation into the
//! summary, findings, suggestions and storyline of a `Narrative`. All text
//! assembly is deterministic; a clause appears only when its supporting
//! statistic is present, and clause order is fixed.
//!
//! Variant behavior (storyline on/off, "real users only") is selected by
//! `NarrativeOptions` rather than parallel composer implementations.

use crate::agg;
use crate::detect::{Detection, detect_level_shift};
use crate::domain::{
    DetectorParams, Narrative, NarrativeOptions, NarrativeStats, Segment, Series, SeriesKind,
    Storyline, TableSet,
};

/// Summary used whenever the filtered tables cannot support a narrative.
pub const NO_DATA_SUMMARY: &str = "no data for current filter";

/// The single suggestion attached to the no-data narrative.
pub const NO_DATA_SUGGESTION: &str =
    "check the data files or adjust the product line filter";

/// Fallback when no statistic supports a specific suggestion.
pub const GENERIC_SUGGESTION: &str = "no suggestion is strongly supported by the \
current data; review the charts manually and set review metrics for the next period";

/// Everything one composer run produces.
///
/// The detection and representative series ride along with the narrative so
/// the presentation layer can plot the segmentation without recomputing it.
#[derive(Debug, Clone)]
pub struct ComposedReport {
    pub narrative: Narrative,
    pub detection: Detection,
    pub series: Option<Series>,
    pub series_kind: Option<SeriesKind>,
}

/// Compose a narrative from filtered tables.
///
/// `products` is the selection in order; the leading-product comparison only
/// ever considers the first two entries.
pub fn compose(
    tables: &TableSet,
    products: &[String],
    detector: &DetectorParams,
    opts: &NarrativeOptions,
) -> ComposedReport {
    let total_users = agg::kpi_total(&tables.kpi);

    let representative = agg::dau_series(&tables.daily_usage)
        .map(|s| (s, SeriesKind::Dau))
        .or_else(|| agg::new_user_series(&tables.new_users).map(|s| (s, SeriesKind::NewUsers)));

    let Some((series, series_kind)) = representative else {
        return no_data_report(total_users);
    };
    if total_users == 0 {
        return no_data_report(total_users);
    }

    let stats = compute_stats(tables, products, total_users, opts);
    let observation_period = observation_period(tables);
    let detection = detect_level_shift(&series, detector);

    let summary = build_summary(&stats, products, tables);
    let storyline = opts
        .story
        .then(|| build_storyline(&series, series_kind, &detection));
    let findings = build_findings(&stats);
    let suggestions = build_suggestions(&stats, products);

    ComposedReport {
        narrative: Narrative {
            summary,
            findings,
            suggestions,
            observation_period,
            storyline,
            stats,
        },
        detection,
        series: Some(series),
        series_kind: Some(series_kind),
    }
}

fn no_data_report(total_users: u64) -> ComposedReport {
    ComposedReport {
        narrative: Narrative {
            summary: NO_DATA_SUMMARY.to_string(),
            findings: Vec::new(),
            suggestions: vec![NO_DATA_SUGGESTION.to_string()],
            observation_period: None,
            storyline: None,
            stats: NarrativeStats {
                total_users,
                ..NarrativeStats::default()
            },
        },
        detection: Detection {
            before: None,
            change: None,
            after: None,
        },
        series: None,
        series_kind: None,
    }
}

fn compute_stats(
    tables: &TableSet,
    products: &[String],
    total_users: u64,
    opts: &NarrativeOptions,
) -> NarrativeStats {
    let mut stats = NarrativeStats {
        total_users,
        ..NarrativeStats::default()
    };

    // Leading product: only the first two selected lines are compared; ties
    // favor the first.
    if products.len() >= 2 {
        let totals_for = |product: &str| -> u64 {
            if opts.real_users_only {
                agg::new_user_product_total(&tables.new_users, product)
            } else {
                agg::kpi_product_total(&tables.kpi, product)
            }
        };
        let a = totals_for(&products[0]);
        let b = totals_for(&products[1]);
        if a + b > 0 {
            let (lead, count) = if a >= b {
                (&products[0], a)
            } else {
                (&products[1], b)
            };
            stats.lead_product = Some(lead.clone());
            stats.lead_count = Some(count);
            if total_users > 0 {
                stats.lead_pct = Some(round1(100.0 * count as f64 / total_users as f64));
            }
        }
    }

    if let Some(dau) = agg::dau_series(&tables.daily_usage) {
        stats.dau_mean = dau.mean();
        if let Some(peak) = dau.peak() {
            stats.max_dau = Some(peak.value as u64);
            stats.max_dau_date = Some(peak.date);
        }
    }

    if let Some(new) = agg::new_user_series(&tables.new_users) {
        stats.total_new = Some(new.total() as u64);
        stats.zero_days = Some(new.zero_count());
        stats.new_peak = new.peak().map(|p| p.value as u64);
    }

    if let Some(tasks) = agg::task_series_7d(&tables.peak_7d) {
        if let Some(peak) = tasks.peak() {
            stats.peak_date = Some(peak.date);
            stats.peak_val = Some(peak.value as u64);
        }
    }

    stats.busy_slot = agg::busy_slot(&tables.peak_48h);

    stats
}

/// Observation window: the externally supplied record wins; otherwise the
/// min/max date across the dated tables; otherwise absent.
fn observation_period(tables: &TableSet) -> Option<Segment> {
    if let Some(obs) = tables.observation {
        return Some(Segment::new(obs.start_date, obs.end_date));
    }

    let dates = tables
        .peak_7d
        .iter()
        .map(|r| r.date)
        .chain(tables.daily_usage.iter().map(|r| r.date))
        .chain(tables.new_users.iter().map(|r| r.date));

    let (mut min, mut max) = (None, None);
    for date in dates {
        min = Some(min.map_or(date, |m: chrono::NaiveDate| m.min(date)));
        max = Some(max.map_or(date, |m: chrono::NaiveDate| m.max(date)));
    }
    Some(Segment::new(min?, max?))
}

fn build_summary(stats: &NarrativeStats, products: &[String], tables: &TableSet) -> String {
    let mut summary = format!(
        "Across the selected product lines, cumulative users total {}",
        stats.total_users
    );

    let mut breakdown = Vec::new();
    for product in products {
        let v = agg::kpi_product_total(&tables.kpi, product);
        if v > 0 {
            let pct = round1(100.0 * v as f64 / stats.total_users as f64);
            breakdown.push(format!("{product} {v} ({pct}%)"));
        }
    }
    if breakdown.is_empty() {
        summary.push('.');
    } else {
        summary.push_str(&format!(", of which {}.", breakdown.join(", ")));
    }

    if let (Some(date), Some(val)) = (stats.peak_date, stats.peak_val) {
        summary.push_str(&format!(
            " The 7-day usage peak fell on {date} ({val} tasks that day)."
        ));
    }
    if let (Some(max), Some(date)) = (stats.max_dau, stats.max_dau_date) {
        summary.push_str(&format!(" Peak daily actives reached {max} on {date}."));
    }
    if let (Some(total), Some(peak)) = (stats.total_new, stats.new_peak) {
        summary.push_str(&format!(
            " {total} new users joined over the window, with a single-day high of {peak}."
        ));
    }

    summary
}

/// Setup / conflict / resolution strictly from the detector's segmentation.
///
/// When no change point exists the conflict and resolution say so explicitly;
/// no trend is ever invented.
fn build_storyline(series: &Series, kind: SeriesKind, detection: &Detection) -> Storyline {
    let label = kind.display_name();

    let (before_lo, before_hi) = match detection.change {
        Some(cp) => (0, cp.index),
        None => (0, series.len()),
    };
    let before_mean = series.mean_range(before_lo, before_hi).unwrap_or(0.0);

    let setup = match detection.before {
        Some(seg) => format!(
            "Between {} and {}, {label} averaged {:.1} per day.",
            seg.start, seg.end, before_mean
        ),
        None => format!("No observations of {label} are available."),
    };

    let (conflict, resolution) = match detection.change {
        Some(cp) => {
            let value = series.points()[cp.index].value;
            let pct = 100.0 * (value - before_mean) / before_mean;
            let direction = if value >= before_mean {
                "increase"
            } else {
                "decrease"
            };
            let conflict = format!(
                "On {}, {label} moved to {:.0}, a {:.1}% {direction} against the prior average.",
                cp.date,
                value,
                pct.abs()
            );

            let after_mean = series
                .mean_range(cp.index, series.len())
                .unwrap_or(value);
            let comparison = if after_mean > before_mean {
                "above"
            } else if after_mean < before_mean {
                "below"
            } else {
                "level with"
            };
            let resolution = format!(
                "From {} onward, {label} averaged {:.1} versus {:.1} beforehand, settling {comparison} the earlier level.",
                cp.date, after_mean, before_mean
            );
            (conflict, resolution)
        }
        None => (
            format!(
                "No change point was detected; {label} stayed within its usual range for the whole period."
            ),
            "The period reads as stable end to end; no before/after comparison applies."
                .to_string(),
        ),
    };

    Storyline {
        setup,
        conflict,
        resolution,
    }
}

/// Findings in fixed order: product comparison, activity, new-user cadence,
/// busy hours. Each needs its supporting statistic.
fn build_findings(stats: &NarrativeStats) -> Vec<String> {
    let mut findings = Vec::new();

    if let (Some(lead), Some(count), Some(pct)) =
        (&stats.lead_product, stats.lead_count, stats.lead_pct)
    {
        findings.push(format!(
            "Product comparison: {lead} leads with {count} users ({pct}%) and is the \
main source of usage; a resource tilt toward it is backed by the data."
        ));
    }

    if let Some(mean) = stats.dau_mean {
        let peak_clause = match (stats.max_dau, stats.max_dau_date) {
            (Some(max), Some(date)) => format!(", peaking at {max} on {date}"),
            _ => String::new(),
        };
        findings.push(format!(
            "Activity: average daily actives over the window were about {mean:.1}{peak_clause}; \
the base is still small and volatile, so retention is not yet settled."
        ));
    }

    if let (Some(zero_days), Some(total_new)) = (stats.zero_days, stats.total_new) {
        if zero_days > 0 {
            findings.push(format!(
                "New-user cadence: {zero_days} of the observed days saw zero signups against \
{total_new} total new users; acquisition is uneven and the exposure and conversion funnel \
needs review."
            ));
        }
    }

    if let Some(slot) = &stats.busy_slot {
        findings.push(format!(
            "Busy hours: usage concentrates around {slot}; capacity and stability matter \
most in that window."
        ));
    }

    findings
}

/// Suggestions in fixed order: acquisition, capacity/timing, product-line
/// allocation, retention, weekly rhythm, with one generic fallback when
/// nothing fires.
fn build_suggestions(stats: &NarrativeStats, products: &[String]) -> Vec<String> {
    let mut suggestions = Vec::new();

    if let (Some(zero_days), Some(total_new)) = (stats.zero_days, stats.total_new) {
        if zero_days > 0 {
            suggestions.push(format!(
                "Acquisition: with {zero_days} zero-signup days and {total_new} new users in \
the window, break exposure and conversion down by channel and set a concrete signup target \
for the next period."
            ));
        }
    }

    if let Some(slot) = &stats.busy_slot {
        suggestions.push(format!(
            "Capacity and timing: guarantee service capacity around {slot} and schedule \
lightweight pushes there to lift conversion."
        ));
    }

    if let (Some(lead), Some(count), Some(pct)) =
        (&stats.lead_product, stats.lead_count, stats.lead_pct)
    {
        let other = products
            .iter()
            .find(|p| *p != lead)
            .map(String::as_str)
            .unwrap_or("the other line");
        suggestions.push(format!(
            "Product lines: {lead} leads ({count} users, {pct}%); keep its resourcing and \
experience first, and run a cross-line funnel experiment toward {other}."
        ));
    }

    if let Some(mean) = stats.dau_mean {
        suggestions.push(format!(
            "Retention: with average daily actives around {mean:.1}, set a retention and \
re-engagement cadence (one touchpoint per week) and track next-week retention."
        ));
    }

    if let (Some(date), Some(val)) = (stats.peak_date, stats.peak_val) {
        suggestions.push(format!(
            "Weekly rhythm: the 7-day peak fell on {date} ({val} tasks); concentrate feature \
and ops work around it and run targeted recalls on quiet days."
        ));
    }

    if suggestions.is_empty() {
        suggestions.push(GENERIC_SUGGESTION.to_string());
    }

    suggestions
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
