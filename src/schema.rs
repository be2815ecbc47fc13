//! Column-name recovery for headerless AMOD-style data files.
//!
//! AMoDeus writes its data files without header rows. Column names come from
//! an optional `description.csv` sidecar, or, for the occupancy status file,
//! from a versioned name table keyed by the actual column count.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};

/// Reference column list for `statusDistributionNumPassengers`, newest
/// simulator version first. Older versions omit leading columns.
pub const STATUS_COLUMNS: [&str; 8] = [
    "4 pax",
    "3 pax",
    "2 pax",
    "1 pax",
    "0 pax",
    "rebalance",
    "stay",
    "off-service",
];

/// Reads column names from a `description.csv` sidecar, if one exists.
///
/// The sidecar is a single line of comma-space-separated names, optionally
/// quoted. Returns `Ok(None)` when the file is absent; the caller must then
/// assign names another way.
pub fn read_column_names(dir: &Path) -> AnalysisResult<Option<Vec<String>>> {
    let desc = dir.join("description.csv");
    if !desc.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&desc)?;
    let first_line = content.lines().next().unwrap_or("");
    let cleaned = first_line.replace('"', "");
    let cols: Vec<String> = cleaned.split(", ").map(str::to_owned).collect();

    debug!(path = %desc.display(), columns = cols.len(), "Read sidecar column names");
    Ok(Some(cols))
}

/// Returns the column names for a status file with `count` columns.
///
/// Known layouts: the full 8-column list, and the 7-column layout of older
/// simulator versions (missing the leading `4 pax` column). Any other count
/// is rejected rather than silently truncated.
pub fn status_columns(count: usize) -> AnalysisResult<&'static [&'static str]> {
    match count {
        8 => Ok(&STATUS_COLUMNS),
        7 => Ok(&STATUS_COLUMNS[1..]),
        _ => Err(AnalysisError::Schema(format!(
            "status file has {count} columns; known layouts have 7 or 8"
        ))),
    }
}
