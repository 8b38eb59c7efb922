//! Sentinel filtering for decomposed levels
//!
//! Wind speed, direction and altitude are not checked: a missing wind already
//! shows up as sentinel u/v, and altitude is carried through as reported.

use crate::app::models::CanonicalLevel;
use tracing::{debug, info};

use super::stats::AssemblyStats;

/// Drop every level with the sentinel in a checked field
pub fn drop_sentinel_levels(
    levels: Vec<CanonicalLevel>,
    stats: &mut AssemblyStats,
) -> Vec<CanonicalLevel> {
    let before = levels.len();
    let kept: Vec<CanonicalLevel> = levels
        .into_iter()
        .filter(|level| {
            let keep = passes_sentinel_filter(level);
            if !keep {
                debug!("Dropping level at {} hPa: missing value", level.pressure);
            }
            keep
        })
        .collect();

    stats.sentinel_dropped = before - kept.len();
    info!(
        "Sentinel filtering complete: {} -> {} levels ({} dropped)",
        before,
        kept.len(),
        stats.sentinel_dropped
    );

    kept
}

/// True when pressure, temperature, dewpoint, u_wind and v_wind are all present
pub fn passes_sentinel_filter(level: &CanonicalLevel) -> bool {
    !level.has_sentinel()
}
