//! Result-set discovery: run enumeration, family classification, and
//! iteration-directory resolution.
//!
//! A result set is a directory with one subdirectory per algorithm run.
//! DRT-style runs keep per-iteration output under `output/ITERS/`; AMOD-style
//! runs write flat data files under `output/data/`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};

/// The two supported simulator output families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// MATSim DRT layout: iterative logs, semicolon-delimited stats files.
    Drt,
    /// AMoDeus layout: flat headerless CSVs with an optional
    /// `description.csv` sidecar.
    Amod,
}

/// One algorithm run inside a result set.
#[derive(Debug, Clone)]
pub struct AlgorithmRun {
    pub algorithm: String,
    pub family: Family,
    pub path: PathBuf,
}

/// Maps run directory names to a [`Family`] via an ordered prefix-rule table.
///
/// The default classifier reproduces the historical convention: names
/// starting with `DRT` are DRT-style and everything else falls back to
/// AMOD-style, so every name classifies. [`Classifier::strict`] instead
/// only accepts known dispatcher prefixes and rejects anything else, which
/// catches misnamed or unsupported runs early.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(String, Family)>,
    fallback: Option<Family>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            rules: vec![("DRT".into(), Family::Drt)],
            fallback: Some(Family::Amod),
        }
    }
}

impl Classifier {
    /// Classifier that only accepts the dispatcher names the tool has been
    /// validated against. Unknown prefixes fail with
    /// [`AnalysisError::UnknownFamily`].
    pub fn strict() -> Self {
        let rules = [
            ("DRT", Family::Drt),
            ("DynamicRideSharingStrategy", Family::Amod),
            ("ExtDemandSupplyBeamSharing", Family::Amod),
            ("HighCapacityDispatcher", Family::Amod),
            ("TShareDispatcher", Family::Amod),
        ];
        Self {
            rules: rules
                .iter()
                .map(|(p, f)| (p.to_string(), *f))
                .collect(),
            fallback: None,
        }
    }

    /// Classifies a run directory base name. Pure and idempotent; first
    /// matching prefix rule wins.
    pub fn classify(&self, name: &str) -> AnalysisResult<Family> {
        for (prefix, family) in &self.rules {
            if name.starts_with(prefix.as_str()) {
                return Ok(*family);
            }
        }
        self.fallback
            .ok_or_else(|| AnalysisError::UnknownFamily(name.to_string()))
    }
}

/// Enumerates the algorithm runs under a result-set root.
///
/// Only immediate subdirectories count; plain files are skipped. Runs are
/// returned sorted by name so downstream output is deterministic.
pub fn list_runs(root: &Path, classifier: &Classifier) -> AnalysisResult<Vec<AlgorithmRun>> {
    let mut runs = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        let family = classifier.classify(&name)?;
        runs.push(AlgorithmRun {
            algorithm: name,
            family,
            path: entry.path(),
        });
    }

    runs.sort_by(|a, b| a.algorithm.cmp(&b.algorithm));
    debug!(root = %root.display(), count = runs.len(), "Enumerated algorithm runs");
    Ok(runs)
}

/// Returns the highest-numbered iteration directory of a DRT-style run.
///
/// Iteration directories live under `<run>/output/ITERS/` and carry a
/// trailing `.<n>` token in their name (e.g. `it.12`). The entry with the
/// maximum `n` wins.
pub fn last_iteration_dir(run_path: &Path) -> AnalysisResult<PathBuf> {
    let iters = run_path.join("output").join("ITERS");
    let mut best: Option<(u32, PathBuf)> = None;

    for entry in fs::read_dir(&iters).map_err(|_| AnalysisError::NotFound(iters.clone()))? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let number = parse_iteration_number(&name)?;
        if best.as_ref().map_or(true, |(n, _)| number > *n) {
            best = Some((number, entry.path()));
        }
    }

    match best {
        Some((number, path)) => {
            debug!(iteration = number, path = %path.display(), "Selected last iteration");
            Ok(path)
        }
        None => Err(AnalysisError::NotFound(iters)),
    }
}

/// Parses the trailing `.`-separated token of an iteration directory name.
fn parse_iteration_number(name: &str) -> AnalysisResult<u32> {
    let token = name.rsplit('.').next().unwrap_or(name);
    token.parse::<u32>().map_err(|_| {
        AnalysisError::Parse(format!(
            "iteration directory '{name}' has non-numeric suffix '{token}'"
        ))
    })
}

/// Finds the file in an iteration directory whose name ends with `suffix`.
///
/// If several entries match, the lexicographically smallest name is taken so
/// the choice does not depend on filesystem enumeration order.
pub fn find_iteration_file(iter_dir: &Path, suffix: &str) -> AnalysisResult<PathBuf> {
    let mut matches: Vec<PathBuf> = Vec::new();

    for entry in fs::read_dir(iter_dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().ends_with(suffix) {
            matches.push(entry.path());
        }
    }

    matches.sort();
    matches
        .into_iter()
        .next()
        .ok_or_else(|| AnalysisError::NotFound(iter_dir.join(format!("*{suffix}"))))
}
