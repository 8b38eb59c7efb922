//! Profile assembler

use crate::app::models::{CanonicalLevel, Profile};
use crate::constants::DEFAULT_MAX_LEVELS;
use crate::{Error, Result};
use tracing::{debug, info};

use super::deduplication::deduplicate_pressures;
use super::sentinel_filter::drop_sentinel_levels;
use super::stats::{AssemblyResult, AssemblyStats};

/// Builds the canonical profile from decomposed levels
#[derive(Debug, Clone)]
pub struct ProfileAssembler {
    max_levels: usize,
}

impl ProfileAssembler {
    pub fn new(max_levels: usize) -> Self {
        Self { max_levels }
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Fail with `ProfileTooLarge` once more than `max_levels` records are seen
    pub fn check_size(&self, records: usize) -> Result<()> {
        if records > self.max_levels {
            return Err(Error::ProfileTooLarge {
                levels: records,
                limit: self.max_levels,
            });
        }
        Ok(())
    }

    /// Filter, deduplicate and order the levels into a profile
    pub fn assemble(&self, levels: Vec<CanonicalLevel>) -> Result<AssemblyResult> {
        self.check_size(levels.len())?;

        let mut stats = AssemblyStats::new();
        stats.records_in = levels.len();

        let levels = drop_sentinel_levels(levels, &mut stats);
        let mut levels = deduplicate_pressures(levels, &mut stats);

        if levels.is_empty() {
            return Err(Error::EmptyProfile {
                records_seen: stats.records_in,
            });
        }

        levels.sort_by(|a, b| b.pressure.total_cmp(&a.pressure));
        stats.retained = levels.len();

        debug!(
            "Profile spans {} hPa to {} hPa",
            levels[0].pressure,
            levels[levels.len() - 1].pressure
        );
        info!("Profile assembled: {}", stats.summary());

        let profile = Profile::new(levels)?;
        Ok(AssemblyResult { profile, stats })
    }
}

impl Default for ProfileAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVELS)
    }
}
