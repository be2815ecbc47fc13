//! Error types for the analysis library.
//!
//! Every failure is surfaced to the caller of the per-run processing
//! functions; the only recovery point is the per-run loop in [`crate::report`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while locating, parsing, or aggregating
/// simulation output.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// An expected file or directory was absent, or a glob/suffix search
    /// produced no match.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Column layout of a data file does not reconcile with a known schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// Malformed delimited content or a non-numeric token where a number
    /// was required.
    #[error("parse error: {0}")]
    Parse(String),

    /// A run directory name matched no classification rule.
    #[error("unknown algorithm family for run '{0}'")]
    UnknownFamily(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("chart error: {0}")]
    Chart(String),
}

/// Alias for `Result<T, AnalysisError>`.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
