//! Hodograph sample preparation
//!
//! Raw balloon winds are noisy at the sampling rate, so the renderer is handed a
//! trailing rolling mean of u/v, split into altitude bands and thinned to every
//! n-th sample per band.

use crate::app::models::Profile;
use crate::constants::{
    DEFAULT_HODOGRAPH_BANDS, DEFAULT_HODOGRAPH_STRIDE, DEFAULT_HODOGRAPH_WINDOW,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Half-open altitude band [lower, upper) in metres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeBand {
    pub lower: f64,
    pub upper: f64,
}

impl AltitudeBand {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, altitude: f64) -> bool {
        altitude >= self.lower && altitude < self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HodographPoint {
    /// Altitude of the last sample in the averaging window (m)
    pub altitude: f64,
    pub u_wind: f64,
    pub v_wind: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HodographSegment {
    pub band: AltitudeBand,
    pub points: Vec<HodographPoint>,
}

/// Smoothed, banded wind samples for the hodograph renderer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hodograph {
    pub segments: Vec<HodographSegment>,
}

impl Hodograph {
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct HodographSampler {
    window: usize,
    stride: usize,
    bands: Vec<AltitudeBand>,
}

impl Default for HodographSampler {
    fn default() -> Self {
        Self {
            window: DEFAULT_HODOGRAPH_WINDOW,
            stride: DEFAULT_HODOGRAPH_STRIDE,
            bands: DEFAULT_HODOGRAPH_BANDS
                .iter()
                .map(|&(lower, upper)| AltitudeBand::new(lower, upper))
                .collect(),
        }
    }
}

impl HodographSampler {
    pub fn new(window: usize, stride: usize, bands: Vec<AltitudeBand>) -> Self {
        Self {
            window: window.max(1),
            stride: stride.max(1),
            bands,
        }
    }

    pub fn sample(&self, profile: &Profile) -> Hodograph {
        let smoothed = self.rolling_mean(profile);

        let segments = self
            .bands
            .iter()
            .map(|band| HodographSegment {
                band: *band,
                points: smoothed
                    .iter()
                    .filter(|point| band.contains(point.altitude))
                    .step_by(self.stride)
                    .copied()
                    .collect(),
            })
            .collect();

        let hodograph = Hodograph { segments };
        debug!(
            "Hodograph: {} smoothed samples, {} plotted",
            smoothed.len(),
            hodograph.point_count()
        );
        hodograph
    }

    /// Trailing mean over `window` levels; leading incomplete windows are dropped
    fn rolling_mean(&self, profile: &Profile) -> Vec<HodographPoint> {
        let levels = profile.levels();
        if levels.len() < self.window {
            return Vec::new();
        }

        let n = self.window as f64;
        let mut sum_u: f64 = levels[..self.window].iter().map(|l| l.u_wind).sum();
        let mut sum_v: f64 = levels[..self.window].iter().map(|l| l.v_wind).sum();
        let mut points = Vec::with_capacity(levels.len() - self.window + 1);

        for end in self.window - 1..levels.len() {
            if end >= self.window {
                let (entering, leaving) = (&levels[end], &levels[end - self.window]);
                sum_u += entering.u_wind - leaving.u_wind;
                sum_v += entering.v_wind - leaving.v_wind;
            }
            points.push(HodographPoint {
                altitude: levels[end].altitude,
                u_wind: sum_u / n,
                v_wind: sum_v / n,
            });
        }
        points
    }
}
