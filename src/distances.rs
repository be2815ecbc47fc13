//! Fleet distance statistics, reported in meters.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::discover::{AlgorithmRun, Family};
use crate::error::AnalysisResult;
use crate::table::{read_amod_csv, Table};

/// Distance totals for one algorithm run.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceStats {
    #[serde(rename = "total distance")]
    pub total_distance: f64,
    #[serde(rename = "total empty distance")]
    pub total_empty_distance: f64,
    #[serde(rename = "empty ratio")]
    pub empty_ratio: f64,
}

/// Computes distance statistics for a run, dispatching on family.
pub fn distance_stats(run: &AlgorithmRun) -> AnalysisResult<DistanceStats> {
    match run.family {
        Family::Drt => drt_distances(&run.path),
        Family::Amod => amod_distances(&run.path),
    }
}

/// DRT logs one row of pre-aggregated vehicle stats per iteration; the last
/// row holds the converged values, already in the output field vocabulary.
fn drt_distances(run_path: &Path) -> AnalysisResult<DistanceStats> {
    let path = run_path.join("output").join("drt_vehicle_stats_av.csv");
    let table = Table::from_path_with_headers(&path, b';')?;

    let stats = DistanceStats {
        total_distance: table.last_row_numeric("totalDistance")?,
        total_empty_distance: table.last_row_numeric("totalEmptyDistance")?,
        empty_ratio: table.last_row_numeric("emptyRatio")?,
    };
    debug!(path = %path.display(), "Read DRT vehicle stats");
    Ok(stats)
}

/// AMOD logs raw per-request distances in kilometers; totals are column sums
/// scaled to meters, with the empty distance derived from pickup plus
/// rebalancing legs.
fn amod_distances(run_path: &Path) -> AnalysisResult<DistanceStats> {
    let path = run_path.join("output").join("data").join("DistancesOverDay");
    let table = read_amod_csv(&path)?;

    let total_distance = table.numeric_sum("total distance")? * 1000.0;
    let pickup = table.numeric_sum("pickup distance")? * 1000.0;
    let rebalancing = table.numeric_sum("rebalancing distance")? * 1000.0;

    let total_empty_distance = pickup + rebalancing;
    debug!(path = %path.display(), rows = table.len(), "Read AMOD distances");
    Ok(DistanceStats {
        total_distance,
        total_empty_distance,
        empty_ratio: total_empty_distance / total_distance,
    })
}
