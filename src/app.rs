//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the report pipeline
//! - prints the report/status/plot
//! - writes optional exports and debug bundles

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, MockArgs, ReportArgs};
use crate::data::TableCache;
use crate::domain::{DetectorParams, NarrativeOptions, ReportConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `insight` binary.
pub fn run() -> Result<(), AppError> {
    // Pick up INSIGHT_DATA_DIR from a local .env if present.
    dotenvy::dotenv().ok();

    // We want `insight` and `insight -p basketball` to behave like
    // `insight report ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args, OutputMode::Full),
        Command::Status(args) => handle_report(args, OutputMode::StatusOnly),
        Command::Mock(args) => handle_mock(args),
        Command::Debug(args) => handle_debug(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    StatusOnly,
}

fn handle_report(args: ReportArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = report_config_from_args(&args)?;
    let mut cache = TableCache::new();
    let run = pipeline::run_report(&config, &mut cache)?;

    if let Some(warnings) = crate::report::format_row_warnings(&run.row_errors) {
        eprint!("{warnings}");
    }

    match mode {
        OutputMode::Full => {
            println!(
                "{}",
                crate::report::format_report(&run.products, &run.narrative, run.status, &run.detection)
            );

            if config.plot {
                if let (Some(series), Some(kind)) = (&run.series, run.series_kind) {
                    let plot = crate::plot::render_series_plot(
                        series,
                        run.detection.change.as_ref(),
                        kind,
                        config.plot_width,
                        config.plot_height,
                    );
                    println!("{plot}");
                }
            }
        }
        OutputMode::StatusOnly => {
            println!("{}", crate::report::format_status_line(run.status));
        }
    }

    if let Some(path) = &config.export {
        let report = crate::io::report_file(
            &run.products,
            &run.narrative,
            run.status,
            run.detection,
            run.series_kind,
            run.series.as_ref(),
        );
        crate::io::write_report_json(path, &report)?;
    }

    Ok(())
}

fn handle_mock(args: MockArgs) -> Result<(), AppError> {
    let dir = resolve_data_dir(args.data_dir);
    let tables = crate::data::generate_mock_tables(args.seed)?;
    crate::data::write_mock_csvs(&dir, &tables)?;
    println!("Mock dataset (seed {}) written to {}", args.seed, dir.display());
    Ok(())
}

fn handle_debug(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args)?;
    let mut cache = TableCache::new();
    let run = pipeline::run_report(&config, &mut cache)?;

    let path = crate::debug::write_debug_bundle(&PathBuf::from("debug"), &run, &config)?;
    println!("Debug bundle written to {}", path.display());
    Ok(())
}

pub fn report_config_from_args(args: &ReportArgs) -> Result<ReportConfig, AppError> {
    if !(args.change_ratio.is_finite() && args.change_ratio > 1.0) {
        return Err(AppError::config("change-ratio must be a finite value > 1."));
    }
    if args.min_before == 0 {
        return Err(AppError::config("min-before must be at least 1."));
    }

    Ok(ReportConfig {
        data_dir: resolve_data_dir(args.data_dir.clone()),
        products: args.products.clone(),
        region: args.region.clone(),
        options: NarrativeOptions {
            story: !args.no_story,
            real_users_only: args.real_users_only,
        },
        detector: DetectorParams {
            min_before: args.min_before,
            change_ratio: args.change_ratio,
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export: args.export.clone(),
    })
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("INSIGHT_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data/processed"))
}

/// Rewrite argv so `insight` defaults to `insight report`.
///
/// Rules:
/// - `insight`                     -> `insight report`
/// - `insight -p basketball ...`   -> `insight report -p basketball ...`
/// - `insight --help/--version`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "status" | "mock" | "debug");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_report() {
        assert_eq!(rewrite_args(argv(&["insight"])), argv(&["insight", "report"]));
        assert_eq!(
            rewrite_args(argv(&["insight", "-p", "basketball"])),
            argv(&["insight", "report", "-p", "basketball"])
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(
            rewrite_args(argv(&["insight", "mock"])),
            argv(&["insight", "mock"])
        );
        assert_eq!(
            rewrite_args(argv(&["insight", "--help"])),
            argv(&["insight", "--help"])
        );
    }

    #[test]
    fn invalid_detector_settings_are_rejected() {
        let args = ReportArgs {
            data_dir: None,
            products: Vec::new(),
            real_users_only: false,
            region: None,
            no_story: false,
            min_before: 2,
            change_ratio: 0.9,
            plot: true,
            no_plot: false,
            width: 80,
            height: 15,
            export: None,
        };
        let err = report_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
