//! Passenger wait-time statistics.
//!
//! The two families log at different granularity: AMOD keeps raw per-request
//! timestamps, DRT keeps pre-aggregated per-iteration summary fields. They
//! are reconciled at the statistic level only, as a mean and 95th percentile.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::discover::{AlgorithmRun, Family};
use crate::error::AnalysisResult;
use crate::table::{read_amod_csv, Table};
use crate::util;

/// Wait-time summary for one algorithm run, in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct WaitStats {
    #[serde(rename = "mean wait")]
    pub mean_wait: f64,
    #[serde(rename = "95p wait")]
    pub p95_wait: f64,
}

/// Computes wait-time statistics for a run, dispatching on family.
pub fn wait_stats(run: &AlgorithmRun) -> AnalysisResult<WaitStats> {
    match run.family {
        Family::Drt => drt_waits(&run.path),
        Family::Amod => amod_waits(&run.path),
    }
}

/// AMOD: per-request wait is pickup minus submission timestamp.
fn amod_waits(run_path: &Path) -> AnalysisResult<WaitStats> {
    let path = run_path.join("output").join("data").join("RequestTravelTimes");
    let table = read_amod_csv(&path)?;

    let submission = table.numeric_column("submission time")?;
    let pickup = table.numeric_column("pickup time")?;
    let waits: Vec<f64> = pickup
        .iter()
        .zip(&submission)
        .map(|(p, s)| p - s)
        .collect();

    debug!(path = %path.display(), requests = waits.len(), "Computed AMOD wait times");
    Ok(WaitStats {
        mean_wait: util::mean(&waits),
        p95_wait: util::quantile(&waits, 0.95),
    })
}

/// DRT: the customer stats file already carries the aggregated fields; only
/// the last iteration's row counts.
fn drt_waits(run_path: &Path) -> AnalysisResult<WaitStats> {
    let path = run_path.join("output").join("drt_customer_stats_av.csv");
    let table = Table::from_path_with_headers(&path, b';')?;

    let stats = WaitStats {
        mean_wait: table.last_row_numeric("wait_average")?,
        p95_wait: table.last_row_numeric("wait_p95")?,
    };
    debug!(path = %path.display(), "Read DRT customer stats");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("fleet_stats_waits_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_amod_waits_from_raw_requests() {
        let run = temp_dir("amod");
        let data = run.join("output").join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(
            data.join("description.csv"),
            "\"submission time, pickup time, dropoff time\"\n",
        )
        .unwrap();
        // Waits: 100, 200, 300, 400.
        fs::write(
            data.join("RequestTravelTimes"),
            "0,100,500\n10,210,600\n20,320,700\n30,430,800\n",
        )
        .unwrap();

        let run = AlgorithmRun {
            algorithm: "TShareDispatcher".into(),
            family: Family::Amod,
            path: run,
        };
        let stats = wait_stats(&run).unwrap();
        assert!((stats.mean_wait - 250.0).abs() < 1e-9);
        // 0.95 * 3 = 2.85 -> 300 + 0.85 * 100
        assert!((stats.p95_wait - 385.0).abs() < 1e-9);

        fs::remove_dir_all(&run.path).unwrap();
    }

    #[test]
    fn test_drt_waits_take_last_iteration_row() {
        let run = temp_dir("drt");
        let output = run.join("output");
        fs::create_dir_all(&output).unwrap();
        fs::write(
            output.join("drt_customer_stats_av.csv"),
            "iteration;wait_average;wait_p95\n0;300.0;700.0\n1;250.5;650.0\n",
        )
        .unwrap();

        let run = AlgorithmRun {
            algorithm: "DRT".into(),
            family: Family::Drt,
            path: run,
        };
        let stats = wait_stats(&run).unwrap();
        assert_eq!(stats.mean_wait, 250.5);
        assert_eq!(stats.p95_wait, 650.0);

        fs::remove_dir_all(&run.path).unwrap();
    }
}
