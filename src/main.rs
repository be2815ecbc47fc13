//! CLI entry point for the fleet-stats tool.
//!
//! Provides subcommands for the full per-result-set report plus single-view
//! commands for occupancy composition, distances, wait times, and chart
//! rendering.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use fleet_stats::chart::{render_occupancy, Palette};
use fleet_stats::discover::{list_runs, Classifier};
use fleet_stats::occupancy::{default_windows, read_occupancy, windowed_composition};
use fleet_stats::output::{append_record, print_json};
use fleet_stats::report::analyze_result_set;
use fleet_stats::{distances, waits};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "fleet_stats")]
#[command(about = "Summary statistics from ride-sharing / AMoD simulation output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full report over a result set: occupancy, distances, and wait times
    Report {
        /// Result-set root directory (one subdirectory per algorithm run)
        #[arg(value_name = "RESULTS_ROOT")]
        results_root: PathBuf,

        /// Write the report as JSON to this file as well as stdout
        #[arg(long)]
        json: Option<PathBuf>,

        /// Append flat per-run summary rows to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Reject run directories with unknown name prefixes
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Morning/evening occupancy composition per run
    Occupancy {
        #[arg(value_name = "RESULTS_ROOT")]
        results_root: PathBuf,

        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Distance totals and empty ratio per run
    Distances {
        #[arg(value_name = "RESULTS_ROOT")]
        results_root: PathBuf,

        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Mean and 95th-percentile wait per run
    Waits {
        #[arg(value_name = "RESULTS_ROOT")]
        results_root: PathBuf,

        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Render a stacked-area occupancy chart per run
    Chart {
        #[arg(value_name = "RESULTS_ROOT")]
        results_root: PathBuf,

        /// Directory to write one SVG per run into
        #[arg(short, long, default_value = "charts")]
        out_dir: PathBuf,

        /// Chart width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Chart height in pixels
        #[arg(long, default_value_t = 768)]
        height: u32,

        #[arg(long, default_value_t = false)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/fleet_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("fleet_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            results_root,
            json,
            csv,
            strict,
        } => {
            let report =
                analyze_result_set(&results_root, &classifier(strict), &default_windows())?;

            if let Some(path) = json {
                fs::write(&path, serde_json::to_string_pretty(&report)?)?;
                info!(path = %path.display(), "Wrote JSON report");
            }
            if let Some(path) = csv {
                for (name, run) in &report.runs {
                    append_record(&path, &run.summary_row(&report.run_id))?;
                    info!(algorithm = name, path = %path.display(), "Appended summary row");
                }
            }
            print_json(&report)?;
        }
        Commands::Occupancy {
            results_root,
            strict,
        } => {
            let windows = default_windows();
            let per_run = for_each_run(&results_root, strict, |run| {
                let table = read_occupancy(run)?;
                Ok(windowed_composition(&table, &windows))
            })?;
            print_json(&per_run)?;
        }
        Commands::Distances {
            results_root,
            strict,
        } => {
            let per_run = for_each_run(&results_root, strict, distances::distance_stats)?;
            print_json(&per_run)?;
        }
        Commands::Waits {
            results_root,
            strict,
        } => {
            let per_run = for_each_run(&results_root, strict, waits::wait_stats)?;
            print_json(&per_run)?;
        }
        Commands::Chart {
            results_root,
            out_dir,
            width,
            height,
            strict,
        } => {
            fs::create_dir_all(&out_dir)?;
            let palette = Palette::default();
            let rendered = for_each_run(&results_root, strict, |run| {
                let table = read_occupancy(run)?;
                let out = out_dir.join(format!("{}.svg", run.algorithm));
                render_occupancy(&table, &run.algorithm, &palette, &out, (width, height))?;
                Ok(out.display().to_string())
            })?;
            print_json(&rendered)?;
        }
    }

    Ok(())
}

fn classifier(strict: bool) -> Classifier {
    if strict {
        Classifier::strict()
    } else {
        Classifier::default()
    }
}

/// Applies one analysis to every run under the root, isolating failures per
/// run so the rest of the result set still gets reported.
fn for_each_run<T, F>(root: &Path, strict: bool, mut f: F) -> Result<BTreeMap<String, T>>
where
    F: FnMut(&fleet_stats::discover::AlgorithmRun) -> fleet_stats::error::AnalysisResult<T>,
{
    let mut results = BTreeMap::new();
    for run in list_runs(root, &classifier(strict))? {
        match f(&run) {
            Ok(value) => {
                results.insert(run.algorithm.clone(), value);
            }
            Err(e) => {
                error!(algorithm = run.algorithm, error = %e, "Run processing failed");
            }
        }
    }
    Ok(results)
}
