//! Debug bundle writer for inspecting a full narrative run.
//!
//! Writes a single markdown file with the run configuration, the computed
//! statistics, the detector's segmentation and the final narrative, so a
//! surprising report can be diagnosed offline.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::ReportConfig;
use crate::error::AppError;

pub fn write_debug_bundle(
    dir: &Path,
    run: &RunOutput,
    config: &ReportConfig,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::internal(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("insight_debug_{ts}.md"));

    let mut out = String::new();
    out.push_str("# insight debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- data_dir: {}\n", config.data_dir.display()));
    out.push_str(&format!("- products: {}\n", run.products.join(", ")));
    out.push_str(&format!(
        "- options: story={}, real_users_only={}\n",
        config.options.story, config.options.real_users_only
    ));
    out.push_str(&format!(
        "- detector: min_before={}, change_ratio={:.2}\n",
        config.detector.min_before, config.detector.change_ratio
    ));

    out.push_str("\n## Status\n");
    out.push_str(&format!("{}\n", crate::report::format_status_line(run.status)));

    out.push_str("\n## Stats\n");
    out.push_str("| stat | value |\n");
    out.push_str("| - | - |\n");
    let stats = &run.narrative.stats;
    out.push_str(&format!("| total_users | {} |\n", stats.total_users));
    out.push_str(&format!("| lead_product | {} |\n", fmt_opt_str(&stats.lead_product)));
    out.push_str(&format!("| lead_count | {} |\n", fmt_opt(stats.lead_count)));
    out.push_str(&format!("| lead_pct | {} |\n", fmt_opt(stats.lead_pct)));
    out.push_str(&format!("| dau_mean | {} |\n", fmt_opt(stats.dau_mean)));
    out.push_str(&format!("| max_dau | {} |\n", fmt_opt(stats.max_dau)));
    out.push_str(&format!("| max_dau_date | {} |\n", fmt_opt(stats.max_dau_date)));
    out.push_str(&format!("| total_new | {} |\n", fmt_opt(stats.total_new)));
    out.push_str(&format!("| zero_days | {} |\n", fmt_opt(stats.zero_days)));
    out.push_str(&format!("| new_peak | {} |\n", fmt_opt(stats.new_peak)));
    out.push_str(&format!("| peak_date | {} |\n", fmt_opt(stats.peak_date)));
    out.push_str(&format!("| peak_val | {} |\n", fmt_opt(stats.peak_val)));
    out.push_str(&format!("| busy_slot | {} |\n", fmt_opt_str(&stats.busy_slot)));

    out.push_str("\n## Detection\n");
    match run.detection.change {
        Some(cp) => out.push_str(&format!("- change point: {} (index {})\n", cp.date, cp.index)),
        None => out.push_str("- change point: none\n"),
    }
    if let Some(seg) = run.detection.before {
        out.push_str(&format!("- before: {} .. {}\n", seg.start, seg.end));
    }
    if let Some(seg) = run.detection.after {
        out.push_str(&format!("- after: {} .. {}\n", seg.start, seg.end));
    }

    if let (Some(series), Some(kind)) = (&run.series, run.series_kind) {
        out.push_str(&format!("\n## Representative series ({})\n", kind.display_name()));
        out.push_str("| date | value |\n");
        out.push_str("| - | - |\n");
        for p in series.points() {
            out.push_str(&format!("| {} | {} |\n", p.date, p.value));
        }
    }

    out.push_str("\n## Narrative\n");
    out.push_str(&format!("Summary: {}\n", run.narrative.summary));
    if let Some(story) = &run.narrative.storyline {
        out.push_str(&format!("\n- setup: {}\n", story.setup));
        out.push_str(&format!("- conflict: {}\n", story.conflict));
        out.push_str(&format!("- resolution: {}\n", story.resolution));
    }
    out.push_str("\nFindings:\n");
    for f in &run.narrative.findings {
        out.push_str(&format!("- {f}\n"));
    }
    out.push_str("\nSuggestions:\n");
    for s in &run.narrative.suggestions {
        out.push_str(&format!("- {s}\n"));
    }

    let mut file = File::create(&path)
        .map_err(|e| AppError::internal(format!("Failed to create debug file: {e}")))?;
    file.write_all(out.as_bytes())
        .map_err(|e| AppError::internal(format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn fmt_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn fmt_opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}
