//! Report output: JSON printing and CSV append.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

/// Prints any serializable report as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends a serializable record as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::Family;
    use crate::report::RunSummaryRow;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_row() -> RunSummaryRow {
        RunSummaryRow {
            run_id: "2020-02-11".into(),
            algorithm: "DRT".into(),
            family: Family::Drt,
            total_distance: 2000.0,
            total_empty_distance: 400.0,
            empty_ratio: 0.2,
            mean_wait: 250.5,
            p95_wait: 650.0,
        }
    }

    #[test]
    fn test_append_record_creates_file() {
        let path = temp_path("fleet_stats_output_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_record(&path, &sample_row()).unwrap();

        assert!(path.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.is_empty());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("fleet_stats_output_header.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &sample_row()).unwrap();
        append_record(&path, &sample_row()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header line should appear exactly once
        let header_count = content.lines().filter(|l| l.contains("algorithm")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_record_two_rows() {
        let path = temp_path("fleet_stats_output_rows.csv");
        let _ = fs::remove_file(&path);

        append_record(&path, &sample_row()).unwrap();
        append_record(&path, &sample_row()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 2 data rows
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }
}
