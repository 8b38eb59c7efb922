//! Assembly statistics and result structures

use crate::app::models::Profile;
use serde::{Deserialize, Serialize};

/// Counts reported by profile assembly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Records offered to the assembler
    pub records_in: usize,
    /// Records dropped for a sentinel in a checked field
    pub sentinel_dropped: usize,
    /// Records dropped as repeated pressures
    pub duplicates_dropped: usize,
    /// Levels in the final profile
    pub retained: usize,
}

impl AssemblyStats {
    pub fn new() -> Self {
        Self {
            records_in: 0,
            sentinel_dropped: 0,
            duplicates_dropped: 0,
            retained: 0,
        }
    }

    /// Percentage of offered records that made it into the profile
    pub fn retention_rate(&self) -> f64 {
        if self.records_in == 0 {
            0.0
        } else {
            (self.retained as f64 / self.records_in as f64) * 100.0
        }
    }

    /// One-line summary for logs and reports
    pub fn summary(&self) -> String {
        format!(
            "{} records -> {} levels ({} missing, {} duplicate, {:.1}% retained)",
            self.records_in,
            self.retained,
            self.sentinel_dropped,
            self.duplicates_dropped,
            self.retention_rate()
        )
    }
}

impl Default for AssemblyStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembled profile with the statistics that produced it
#[derive(Debug, Clone)]
pub struct AssemblyResult {
    pub profile: Profile,
    pub stats: AssemblyStats,
}
