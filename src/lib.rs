//! Summary statistics from transportation-fleet simulation output.
//!
//! Reads the per-algorithm output directories produced by two simulator
//! families (MATSim DRT and AMoDeus-style AMoD engines), normalizes their
//! heterogeneous file formats into common tables, and computes occupancy
//! compositions, distance totals, and wait-time statistics. All analysis is
//! read-only and recomputed on every invocation.

pub mod chart;
pub mod discover;
pub mod distances;
pub mod error;
pub mod occupancy;
pub mod output;
pub mod report;
pub mod schema;
pub mod table;
pub mod util;
pub mod waits;
