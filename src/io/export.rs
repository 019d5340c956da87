//! Report JSON export.
//!
//! The export is the "portable" representation of a narrative run:
//! narrative + status tags + the detector's segmentation + the
//! representative series, so a downstream dashboard can re-render the story
//! without recomputing it.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detect::Detection;
use crate::domain::{Narrative, Series, SeriesKind, StatusTags};
use crate::error::AppError;

/// Everything a narrative run exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub products: Vec<String>,
    pub narrative: Narrative,
    pub status: StatusTags,
    pub detection: Detection,
    pub series_kind: Option<SeriesKind>,
    pub series: Option<Series>,
}

/// Assemble the export payload for one run.
pub fn report_file(
    products: &[String],
    narrative: &Narrative,
    status: StatusTags,
    detection: Detection,
    series_kind: Option<SeriesKind>,
    series: Option<&Series>,
) -> ReportFile {
    ReportFile {
        tool: "insight".to_string(),
        products: products.to_vec(),
        narrative: narrative.clone(),
        status,
        detection,
        series_kind,
        series: series.cloned(),
    }
}

/// Write a report JSON file.
pub fn write_report_json(path: &Path, report: &ReportFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::config(format!(
            "Failed to create report JSON '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::internal(format!("Failed to write report JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ActivityStatus, GrowthStatus, Narrative, NarrativeStats, ScaleStatus,
    };

    #[test]
    fn report_round_trips_through_json() {
        let narrative = Narrative {
            summary: "Across the selected product lines, cumulative users total 28."
                .to_string(),
            findings: vec!["finding".to_string()],
            suggestions: vec!["suggestion".to_string()],
            observation_period: None,
            storyline: None,
            stats: NarrativeStats {
                total_users: 28,
                ..NarrativeStats::default()
            },
        };
        let status = StatusTags {
            scale: ScaleStatus::Pilot,
            activity: ActivityStatus::NoData,
            growth: GrowthStatus::NoData,
        };
        let detection = Detection {
            before: None,
            change: None,
            after: None,
        };

        let products = vec!["basketball".to_string()];
        let report = report_file(&products, &narrative, status, detection, None, None);

        let json = serde_json::to_string(&report).unwrap();
        let back: ReportFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tool, "insight");
        assert_eq!(back.narrative.stats.total_users, 28);
        assert_eq!(back.status.scale, ScaleStatus::Pilot);
    }
}
