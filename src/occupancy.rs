//! Occupancy normalization and time-windowed composition.
//!
//! Both simulator families log how many vehicles sit in each occupancy state
//! over the day, but in different layouts: DRT writes a tab-separated profile
//! with a header row into its last iteration directory, AMOD writes a
//! headerless CSV sampled every few seconds. Both are normalized here into an
//! [`OccupancyTable`] carrying a derived time column plus one series per
//! occupancy state.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::discover::{self, AlgorithmRun, Family};
use crate::error::AnalysisResult;
use crate::schema;
use crate::table::{self, Table};
use crate::util;

/// Occupancy-state vocabulary in stacking order.
pub const OCCUPANCY_STATES: [&str; 9] = [
    "4 pax",
    "3 pax",
    "2 pax",
    "1 pax",
    "0 pax",
    "pickup",
    "rebalance",
    "stay",
    "off-service",
];

/// Subset of states that enters composition percentages and charts.
pub const COMPOSITION_STATES: [&str; 6] = ["4 pax", "3 pax", "2 pax", "1 pax", "0 pax", "stay"];

/// DRT occupancy profiles are sampled every 5 minutes.
///
/// The interval is not recorded in the data itself, so it is an assumption
/// about the simulator configuration rather than a derived value.
pub const DRT_SAMPLE_SECS: f64 = 300.0;

/// AMOD status distributions are sampled every 10 seconds (same caveat as
/// [`DRT_SAMPLE_SECS`]).
pub const AMOD_SAMPLE_SECS: f64 = 10.0;

const DRT_OCCUPANCY_SUFFIX: &str = "drt_occupancy_time_profiles_av.txt";

/// Normalized occupancy time series for one algorithm run.
#[derive(Debug, Clone)]
pub struct OccupancyTable {
    /// States present in the source, in vocabulary order.
    pub states: Vec<String>,
    /// Seconds since simulation start, one entry per row.
    pub times: Vec<f64>,
    /// Vehicle counts per row, aligned with `states`.
    pub rows: Vec<Vec<f64>>,
}

impl OccupancyTable {
    pub fn state_index(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }

    /// All values of one state's series.
    pub fn series(&self, state: &str) -> Option<Vec<f64>> {
        let idx = self.state_index(state)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }
}

/// A named aggregation window over the simulated day, inclusive bounds.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    pub label: String,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl TimeWindow {
    pub fn new(label: &str, start_secs: f64, end_secs: f64) -> Self {
        Self {
            label: label.to_owned(),
            start_secs,
            end_secs,
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_secs && t <= self.end_secs
    }
}

/// The reference windows: morning peak 06:00-09:00, evening peak 15:00-18:00.
pub fn default_windows() -> Vec<TimeWindow> {
    vec![
        TimeWindow::new("morning", 6.0 * 3600.0, 9.0 * 3600.0),
        TimeWindow::new("evening", 15.0 * 3600.0, 18.0 * 3600.0),
    ]
}

/// Fraction of time spent in one occupancy state during a window.
#[derive(Debug, Clone, Serialize)]
pub struct StateShare {
    pub state: String,
    pub share: f64,
}

/// Mean occupancy composition over one window, normalized to sum to 1.
#[derive(Debug, Clone, Serialize)]
pub struct WindowComposition {
    pub window: String,
    pub shares: Vec<StateShare>,
}

/// Reads and normalizes the occupancy series of a run, dispatching on family.
pub fn read_occupancy(run: &AlgorithmRun) -> AnalysisResult<OccupancyTable> {
    match run.family {
        Family::Drt => read_drt_occupancy(&run.path, DRT_SAMPLE_SECS),
        Family::Amod => read_amod_occupancy(&run.path, AMOD_SAMPLE_SECS),
    }
}

/// DRT adapter: tab-separated profile with a header row, taken from the last
/// iteration directory. The time column is derived from the row index.
pub fn read_drt_occupancy(run_path: &Path, sample_secs: f64) -> AnalysisResult<OccupancyTable> {
    let iter_dir = discover::last_iteration_dir(run_path)?;
    let profile = discover::find_iteration_file(&iter_dir, DRT_OCCUPANCY_SUFFIX)?;
    let raw = Table::from_path_with_headers(&profile, b'\t')?;

    let states: Vec<String> = OCCUPANCY_STATES
        .iter()
        .filter(|s| raw.column_index(s).is_some())
        .map(|s| s.to_string())
        .collect();

    let series: Vec<Vec<f64>> = states
        .iter()
        .map(|s| raw.numeric_column(s))
        .collect::<AnalysisResult<_>>()?;

    debug!(path = %profile.display(), states = states.len(), rows = raw.len(), "Read DRT occupancy profile");
    Ok(assemble(states, series, raw.len(), sample_secs))
}

/// AMOD adapter: headerless CSV whose column names come from the versioned
/// status schema table. Rebalancing vehicles carry no passengers, so their
/// count is folded into `0 pax` row by row.
pub fn read_amod_occupancy(run_path: &Path, sample_secs: f64) -> AnalysisResult<OccupancyTable> {
    let status = run_path
        .join("output")
        .join("data")
        .join("statusDistributionNumPassengers");
    let (file, _dir) = table::amod_data_file(&status);
    let mut raw = Table::from_path_headerless(&file, b',', None)?;
    let names = schema::status_columns(raw.width())?;
    raw.set_columns(names.iter().map(|s| s.to_string()).collect())?;

    let states: Vec<String> = OCCUPANCY_STATES
        .iter()
        .filter(|s| raw.column_index(s).is_some())
        .map(|s| s.to_string())
        .collect();

    let mut series: Vec<Vec<f64>> = states
        .iter()
        .map(|s| raw.numeric_column(s))
        .collect::<AnalysisResult<_>>()?;

    let zero_idx = states.iter().position(|s| s == "0 pax");
    let reb_idx = states.iter().position(|s| s == "rebalance");
    if let (Some(zero_idx), Some(reb_idx)) = (zero_idx, reb_idx) {
        let rebalance = series[reb_idx].clone();
        for (value, extra) in series[zero_idx].iter_mut().zip(rebalance) {
            *value += extra;
        }
    }

    debug!(path = %file.display(), states = states.len(), rows = raw.len(), "Read AMOD status distribution");
    Ok(assemble(states, series, raw.len(), sample_secs))
}

fn assemble(
    states: Vec<String>,
    series: Vec<Vec<f64>>,
    len: usize,
    sample_secs: f64,
) -> OccupancyTable {
    let times: Vec<f64> = (0..len).map(|i| i as f64 * sample_secs).collect();
    let rows: Vec<Vec<f64>> = (0..len)
        .map(|i| series.iter().map(|col| col[i]).collect())
        .collect();
    OccupancyTable { states, times, rows }
}

/// Mean composition per window, over the composition-state subset present in
/// the table, normalized so shares sum to 1.
///
/// A window that matches no rows yields NaN shares; callers must check for
/// that rather than reading the values as zeros.
pub fn windowed_composition(
    table: &OccupancyTable,
    windows: &[TimeWindow],
) -> Vec<WindowComposition> {
    let states: Vec<&str> = COMPOSITION_STATES
        .iter()
        .copied()
        .filter(|s| table.state_index(s).is_some())
        .collect();

    windows
        .iter()
        .map(|window| {
            let means: Vec<f64> = states
                .iter()
                .map(|state| {
                    let idx = table.state_index(state).unwrap_or(0);
                    let matched: Vec<f64> = table
                        .times
                        .iter()
                        .zip(&table.rows)
                        .filter(|(t, _)| window.contains(**t))
                        .map(|(_, row)| row[idx])
                        .collect();
                    util::mean(&matched)
                })
                .collect();

            let total: f64 = means.iter().sum();
            let shares = states
                .iter()
                .zip(&means)
                .map(|(state, mean)| StateShare {
                    state: state.to_string(),
                    share: mean / total,
                })
                .collect();

            WindowComposition {
                window: window.label.clone(),
                shares,
            }
        })
        .collect()
}
