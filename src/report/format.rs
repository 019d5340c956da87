//! Formatted terminal output for narrative runs.

use crate::detect::Detection;
use crate::domain::{Narrative, StatusTags};
use crate::io::tables::RowError;

/// Format the full narrative report.
pub fn format_report(
    products: &[String],
    narrative: &Narrative,
    status: StatusTags,
    detection: &Detection,
) -> String {
    let mut out = String::new();

    out.push_str("=== insight - Usage Narrative Report ===\n");
    out.push_str(&format!("Products: {}\n", products.join(", ")));
    match narrative.observation_period {
        Some(period) => out.push_str(&format!(
            "Observation period: {} .. {}\n",
            period.start, period.end
        )),
        None => out.push_str("Observation period: (none)\n"),
    }
    out.push_str(&format!("Status: {}\n", format_status_line(status)));

    out.push_str("\nSummary:\n");
    out.push_str(&format!("  {}\n", narrative.summary));

    if let Some(story) = &narrative.storyline {
        out.push_str("\nStoryline:\n");
        out.push_str(&format!("- setup: {}\n", story.setup));
        out.push_str(&format!("- conflict: {}\n", story.conflict));
        out.push_str(&format!("- resolution: {}\n", story.resolution));
    }

    out.push_str("\nFindings:\n");
    if narrative.findings.is_empty() {
        out.push_str("- (none for the current data)\n");
    }
    for finding in &narrative.findings {
        out.push_str(&format!("- {finding}\n"));
    }

    out.push_str("\nSuggestions:\n");
    for suggestion in &narrative.suggestions {
        out.push_str(&format!("- {suggestion}\n"));
    }

    out.push('\n');
    out.push_str(&format_detection_line(detection));
    out.push('\n');

    out
}

/// One-line status summary (also the `insight status` output).
pub fn format_status_line(status: StatusTags) -> String {
    format!(
        "scale={} | activity={} | growth={}",
        status.scale.display_name(),
        status.activity.display_name(),
        status.growth.display_name()
    )
}

fn format_detection_line(detection: &Detection) -> String {
    match (detection.change, detection.before, detection.after) {
        (Some(cp), Some(before), Some(after)) => format!(
            "Change point: {} (before {} .. {}, after {} .. {})",
            cp.date, before.start, before.end, after.start, after.end
        ),
        _ => match detection.before {
            Some(before) => format!(
                "Change point: none (stable {} .. {})",
                before.start, before.end
            ),
            None => "Change point: none (no observations)".to_string(),
        },
    }
}

/// Row-level ingest problems, formatted as a warning block. Empty input
/// yields `None` so callers can skip the block entirely.
pub fn format_row_warnings(errors: &[RowError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let mut out = format!("Warning: {} row(s) skipped during load:\n", errors.len());
    for e in errors {
        out.push_str(&format!("- {} line {}: {}\n", e.file, e.line, e.message));
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ActivityStatus, ChangePoint, GrowthStatus, NarrativeStats, ScaleStatus, Segment,
        Storyline,
    };
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_narrative() -> Narrative {
        Narrative {
            summary: "Across the selected product lines, cumulative users total 28.".to_string(),
            findings: vec!["Product comparison: basketball leads.".to_string()],
            suggestions: vec!["Retention: keep a weekly touchpoint.".to_string()],
            observation_period: Some(Segment::new(d("2026-01-31"), d("2026-02-26"))),
            storyline: Some(Storyline {
                setup: "setup sentence".to_string(),
                conflict: "conflict sentence".to_string(),
                resolution: "resolution sentence".to_string(),
            }),
            stats: NarrativeStats {
                total_users: 28,
                ..NarrativeStats::default()
            },
        }
    }

    fn sample_status() -> StatusTags {
        StatusTags {
            scale: ScaleStatus::Pilot,
            activity: ActivityStatus::NeedsImprovement,
            growth: GrowthStatus::Unstable,
        }
    }

    #[test]
    fn report_contains_all_sections() {
        let detection = Detection {
            before: Some(Segment::new(d("2026-02-01"), d("2026-02-03"))),
            change: Some(ChangePoint {
                date: d("2026-02-04"),
                index: 3,
            }),
            after: Some(Segment::new(d("2026-02-04"), d("2026-02-04"))),
        };
        let products = vec!["basketball".to_string(), "soccer".to_string()];

        let out = format_report(&products, &sample_narrative(), sample_status(), &detection);
        assert!(out.contains("Products: basketball, soccer"));
        assert!(out.contains("Observation period: 2026-01-31 .. 2026-02-26"));
        assert!(out.contains("scale=pilot | activity=needs-improvement | growth=unstable"));
        assert!(out.contains("Storyline:"));
        assert!(out.contains("Change point: 2026-02-04"));
    }

    #[test]
    fn stable_period_is_stated_not_invented() {
        let detection = Detection {
            before: Some(Segment::new(d("2026-02-01"), d("2026-02-04"))),
            change: None,
            after: None,
        };
        let mut narrative = sample_narrative();
        narrative.storyline = None;

        let out = format_report(
            &["basketball".to_string()],
            &narrative,
            sample_status(),
            &detection,
        );
        assert!(out.contains("Change point: none (stable 2026-02-01 .. 2026-02-04)"));
        assert!(!out.contains("Storyline:"));
    }

    #[test]
    fn row_warnings_are_optional() {
        assert!(format_row_warnings(&[]).is_none());
        let errors = vec![RowError {
            file: "kpi.csv".to_string(),
            line: 3,
            message: "Invalid count for 'value': 'x'".to_string(),
        }];
        let out = format_row_warnings(&errors).unwrap();
        assert!(out.contains("kpi.csv line 3"));
    }
}
