//! Parsing statistics for instrument exports

use crate::app::models::CanonicalLevel;
use crate::constants::is_sentinel;
use serde::{Deserialize, Serialize};

/// Simple parsing statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Number of data records read after the header
    pub total_records: usize,

    /// Records with no sentinel in any canonical field
    pub complete_records: usize,

    /// Individual canonical fields that carried the sentinel
    pub sentinel_fields: usize,

    /// Columns present in the header
    pub header_columns: usize,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            total_records: 0,
            complete_records: 0,
            sentinel_fields: 0,
            header_columns: 0,
        }
    }

    /// Account for one decomposed level
    pub fn record(&mut self, level: &CanonicalLevel) {
        self.total_records += 1;
        let missing = [
            level.pressure,
            level.temperature,
            level.dewpoint,
            level.wind_speed,
            level.wind_direction,
            level.altitude,
        ]
        .into_iter()
        .filter(|value| is_sentinel(*value))
        .count();

        self.sentinel_fields += missing;
        if missing == 0 {
            self.complete_records += 1;
        }
    }

    /// Percentage of records with every field present
    pub fn completeness_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.complete_records as f64 / self.total_records as f64) * 100.0
        }
    }
}

impl Default for ParseStats {
    fn default() -> Self {
        Self::new()
    }
}
