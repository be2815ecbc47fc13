//! Result-set driver: runs every analysis over every algorithm run.
//!
//! Failures are isolated per run so one corrupt output directory does not
//! abort the whole comparison; failed runs land in the report's `failures`
//! map with their error message.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::discover::{self, AlgorithmRun, Classifier, Family};
use crate::distances::{self, DistanceStats};
use crate::error::AnalysisResult;
use crate::occupancy::{self, TimeWindow, WindowComposition};
use crate::waits::{self, WaitStats};

/// Complete statistics for one algorithm run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub algorithm: String,
    pub family: Family,
    pub distances: DistanceStats,
    pub waits: WaitStats,
    pub occupancy: Vec<WindowComposition>,
}

/// Analysis results for a whole result set.
#[derive(Debug, Serialize)]
pub struct ResultSetReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub runs: BTreeMap<String, RunReport>,
    pub failures: BTreeMap<String, String>,
}

/// Flat per-run record for CSV output.
#[derive(Debug, Serialize)]
pub struct RunSummaryRow {
    pub run_id: String,
    pub algorithm: String,
    pub family: Family,
    pub total_distance: f64,
    pub total_empty_distance: f64,
    pub empty_ratio: f64,
    pub mean_wait: f64,
    pub p95_wait: f64,
}

impl RunReport {
    pub fn summary_row(&self, run_id: &str) -> RunSummaryRow {
        RunSummaryRow {
            run_id: run_id.to_owned(),
            algorithm: self.algorithm.clone(),
            family: self.family,
            total_distance: self.distances.total_distance,
            total_empty_distance: self.distances.total_empty_distance,
            empty_ratio: self.distances.empty_ratio,
            mean_wait: self.waits.mean_wait,
            p95_wait: self.waits.p95_wait,
        }
    }
}

/// Runs every analysis over a single algorithm run.
pub fn analyze_run(run: &AlgorithmRun, windows: &[TimeWindow]) -> AnalysisResult<RunReport> {
    let table = occupancy::read_occupancy(run)?;
    Ok(RunReport {
        algorithm: run.algorithm.clone(),
        family: run.family,
        distances: distances::distance_stats(run)?,
        waits: waits::wait_stats(run)?,
        occupancy: occupancy::windowed_composition(&table, windows),
    })
}

/// Analyzes all runs under a result-set root.
pub fn analyze_result_set(
    root: &Path,
    classifier: &Classifier,
    windows: &[TimeWindow],
) -> AnalysisResult<ResultSetReport> {
    let run_id = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(run_id, root = %root.display(), "Analyzing result set");

    let mut runs = BTreeMap::new();
    let mut failures = BTreeMap::new();

    for run in discover::list_runs(root, classifier)? {
        match analyze_run(&run, windows) {
            Ok(report) => {
                info!(algorithm = run.algorithm, "Run analyzed");
                runs.insert(run.algorithm.clone(), report);
            }
            Err(e) => {
                error!(algorithm = run.algorithm, error = %e, "Run analysis failed");
                failures.insert(run.algorithm.clone(), e.to_string());
            }
        }
    }

    Ok(ResultSetReport {
        run_id,
        generated_at: Utc::now(),
        runs,
        failures,
    })
}
