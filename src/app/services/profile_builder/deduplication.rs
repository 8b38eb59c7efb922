//! Pressure-level deduplication
//!
//! Balloon pressure sensors report at a finer cadence than their resolution, so
//! the same pressure is often written several times while the sonde hovers.
//! Only the first record at each pressure is kept.

use crate::app::models::CanonicalLevel;
use std::collections::HashSet;
use tracing::info;

use super::stats::AssemblyStats;

/// Keep the first level at each pressure, preserving input order
pub fn deduplicate_pressures(
    levels: Vec<CanonicalLevel>,
    stats: &mut AssemblyStats,
) -> Vec<CanonicalLevel> {
    let before = levels.len();
    let mut seen = HashSet::with_capacity(levels.len());
    let deduplicated: Vec<CanonicalLevel> = levels
        .into_iter()
        .filter(|level| seen.insert(pressure_key(level.pressure)))
        .collect();

    stats.duplicates_dropped = before - deduplicated.len();
    info!(
        "Deduplication complete: {} -> {} levels ({} duplicates removed)",
        before,
        deduplicated.len(),
        stats.duplicates_dropped
    );

    deduplicated
}

// Exact equality on the parsed value; -0.0 and 0.0 share a key
fn pressure_key(pressure: f64) -> u64 {
    (pressure + 0.0).to_bits()
}
