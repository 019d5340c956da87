//! Shared report pipeline used by every subcommand.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load (cached) -> filter -> compose -> classify
//!
//! The subcommands can then focus on presentation (printing vs JSON vs the
//! debug bundle).

use crate::data::TableCache;
use crate::detect::Detection;
use crate::domain::{Narrative, ReportConfig, Series, SeriesKind, StatusTags};
use crate::error::AppError;
use crate::filter;
use crate::io::tables::RowError;
use crate::narrative::{classify, compose};

/// All computed outputs of a single report run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// The effective product selection, in order.
    pub products: Vec<String>,
    pub narrative: Narrative,
    pub detection: Detection,
    pub status: StatusTags,
    pub series: Option<Series>,
    pub series_kind: Option<SeriesKind>,
    pub row_errors: Vec<RowError>,
}

/// Execute the full report pipeline and return the computed outputs.
///
/// The cache is owned by the caller so repeated runs (e.g. regenerating the
/// narrative for different selections) skip the CSV parse while the source
/// files are unchanged.
pub fn run_report(config: &ReportConfig, cache: &mut TableCache) -> Result<RunOutput, AppError> {
    let loaded = cache.load(&config.data_dir)?;
    let row_errors = loaded.row_errors.clone();

    // An explicit selection is taken as-is (its order drives the leading
    // product comparison); otherwise every line in the KPI table is included.
    let products = if config.products.is_empty() {
        filter::product_options(&loaded.tables)
    } else {
        config.products.clone()
    };

    let mut filtered = filter::select_products(&loaded.tables, &products);
    if config.options.real_users_only {
        match filter::resolve_cutoff(&filtered.releases, config.region.as_deref()) {
            Some(cutoff) => filtered = filter::apply_release_cutoff(&filtered, cutoff),
            None => {
                if let Some(region) = &config.region {
                    return Err(AppError::config(format!(
                        "No release date configured for region '{region}'."
                    )));
                }
                // No release info at all: nothing to cut off.
            }
        }
    }

    let composed = compose(&filtered, &products, &config.detector, &config.options);
    let status = classify(&composed.narrative.stats);

    Ok(RunOutput {
        products,
        narrative: composed.narrative,
        detection: composed.detection,
        status,
        series: composed.series,
        series_kind: composed.series_kind,
        row_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mock::{generate_mock_tables, write_mock_csvs};
    use crate::domain::{DetectorParams, NarrativeOptions, ScaleStatus};
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "insight-pipeline-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn config_for(dir: &PathBuf) -> ReportConfig {
        ReportConfig {
            data_dir: dir.clone(),
            products: Vec::new(),
            region: None,
            options: NarrativeOptions {
                story: true,
                real_users_only: false,
            },
            detector: DetectorParams::default(),
            plot: false,
            plot_width: 80,
            plot_height: 15,
            export: None,
        }
    }

    #[test]
    fn end_to_end_over_mock_data() {
        let dir = scratch_dir("e2e");
        write_mock_csvs(&dir, &generate_mock_tables(42).unwrap()).unwrap();

        let mut cache = TableCache::new();
        let run = run_report(&config_for(&dir), &mut cache).unwrap();

        assert_eq!(run.products, vec!["basketball", "soccer"]);
        assert_eq!(run.narrative.stats.total_users, 28);
        assert_eq!(run.status.scale, ScaleStatus::Pilot);
        assert!(run.narrative.storyline.is_some());
        assert_eq!(run.series_kind, Some(crate::domain::SeriesKind::Dau));
        assert!(run.row_errors.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_selection_degrades_to_no_data() {
        let dir = scratch_dir("unknown");
        write_mock_csvs(&dir, &generate_mock_tables(42).unwrap()).unwrap();

        let mut config = config_for(&dir);
        config.products = vec!["tennis".to_string()];
        let mut cache = TableCache::new();
        let run = run_report(&config, &mut cache).unwrap();

        assert_eq!(run.narrative.summary, "no data for current filter");
        assert_eq!(run.status.scale, ScaleStatus::NoData);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn real_users_only_applies_release_cutoff() {
        let dir = scratch_dir("cutoff");
        write_mock_csvs(&dir, &generate_mock_tables(42).unwrap()).unwrap();

        let mut config = config_for(&dir);
        config.options.real_users_only = true;
        let mut cache = TableCache::new();
        let run = run_report(&config, &mut cache).unwrap();

        // Earliest release is 2026-02-09; nothing before it survives.
        let series = run.series.unwrap();
        assert!(series.first_date().unwrap() >= chrono::NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_region_is_a_config_error() {
        let dir = scratch_dir("region");
        write_mock_csvs(&dir, &generate_mock_tables(42).unwrap()).unwrap();

        let mut config = config_for(&dir);
        config.options.real_users_only = true;
        config.region = Some("mars".to_string());
        let mut cache = TableCache::new();
        let err = run_report(&config, &mut cache).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
