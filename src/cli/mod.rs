//! Command-line parsing for the usage narrative engine.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the aggregation/narrative code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_CHANGE_RATIO, DEFAULT_MIN_BEFORE};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "insight", version, about = "Usage analytics narrative engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate and print the narrative report (the default subcommand).
    Report(ReportArgs),
    /// Print only the status tags (useful for scripting).
    Status(ReportArgs),
    /// Write a seeded mock dataset into the data directory.
    Mock(MockArgs),
    /// Run the pipeline and write a markdown debug bundle.
    Debug(ReportArgs),
}

/// Common options for report generation.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// Data directory holding the processed CSV tables
    /// (default: $INSIGHT_DATA_DIR, else `data/processed`).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Product line to include; repeat for several, in priority order.
    /// Defaults to every line found in the KPI table.
    #[arg(short = 'p', long = "product")]
    pub products: Vec<String>,

    /// Restrict to post-release users: apply the release-date cutoff and
    /// compare product lines by new-user counts.
    #[arg(long)]
    pub real_users_only: bool,

    /// Region whose release date defines the cutoff (default: earliest).
    #[arg(long)]
    pub region: Option<String>,

    /// Disable the setup/conflict/resolution storyline.
    #[arg(long)]
    pub no_story: bool,

    /// Minimum number of leading points before a change point may be declared.
    #[arg(long, default_value_t = DEFAULT_MIN_BEFORE)]
    pub min_before: usize,

    /// Level-shift ratio threshold (must be > 1).
    #[arg(long, default_value_t = DEFAULT_CHANGE_RATIO)]
    pub change_ratio: f64,

    /// Render an ASCII plot of the representative series (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 15)]
    pub height: usize,

    /// Export the report (narrative + status + segmentation) to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for mock dataset generation.
#[derive(Debug, Parser)]
pub struct MockArgs {
    /// Output directory for the generated CSV files
    /// (default: $INSIGHT_DATA_DIR, else `data/processed`).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Random seed for mock generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
