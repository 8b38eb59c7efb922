//! Vertical resampling onto reference pressure levels
//!
//! Two jobs: pick the profile levels nearest the standard RAOB pressures for barb
//! and skew-T annotation, and interpolate temperature or dewpoint at arbitrary
//! pressures for the Haines Index.
//!
//! Selection runs on a median-filtered copy of the pressure sequence. On an
//! assembled profile (strictly descending pressures) a 3-point median is the
//! identity, so here the filter is a safeguard that never changes the selection.
//! The profile itself is never modified.

use crate::app::models::{CanonicalLevel, Profile, ReferenceLevelSet};
use crate::constants::MEDIAN_KERNEL;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Profile levels chosen for a reference level set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSelection {
    /// Profile indices, ascending and unique
    pub indices: Vec<usize>,
    /// Profile pressures at those indices (hPa)
    pub pressures: Vec<f64>,
}

impl ReferenceSelection {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Selected levels from the profile the selection was built from
    pub fn levels<'a>(&'a self, profile: &'a Profile) -> impl Iterator<Item = &'a CanonicalLevel> {
        self.indices
            .iter()
            .filter_map(move |&index| profile.levels().get(index))
    }
}

/// Linear interpolation result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolated {
    pub value: f64,
    /// True when the target lay outside the profile and the end value was used
    pub clamped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VerticalResampler {
    reference: ReferenceLevelSet,
}

impl VerticalResampler {
    pub fn new(reference: ReferenceLevelSet) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceLevelSet {
        &self.reference
    }

    /// Nearest profile level to every reference pressure
    ///
    /// Distances are measured on the median-filtered pressures, which equal the
    /// profile pressures for any validated profile. Ties go to the
    /// lower index. Several reference levels may share one profile level; the
    /// selection keeps it once.
    pub fn select(&self, profile: &Profile) -> ReferenceSelection {
        let filtered = median_filter(&profile.pressures(), MEDIAN_KERNEL);

        let mut indices: Vec<usize> = self
            .reference
            .levels()
            .iter()
            .filter_map(|&target| nearest_index(&filtered, target))
            .collect();
        indices.sort_unstable();
        indices.dedup();

        debug!(
            "Selected {} profile levels for {} reference pressures",
            indices.len(),
            self.reference.len()
        );

        let pressures = indices
            .iter()
            .map(|&index| profile.levels()[index].pressure)
            .collect();
        ReferenceSelection { indices, pressures }
    }
}

/// Sliding median with an odd kernel; the first and last `kernel / 2` samples
/// keep their own values
pub fn median_filter(values: &[f64], kernel: usize) -> Vec<f64> {
    let half = kernel / 2;
    if half == 0 || values.len() < kernel {
        return values.to_vec();
    }

    let mut filtered = values.to_vec();
    let mut window = vec![0.0; 2 * half + 1];
    for i in half..values.len() - half {
        window.copy_from_slice(&values[i - half..=i + half]);
        window.sort_by(f64::total_cmp);
        filtered[i] = window[half];
    }
    filtered
}

/// Index of the value closest to `target`, first index on ties
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(index, _)| index)
}

/// Linear interpolation in pressure over a descending pressure sequence
///
/// Targets above the first pressure or below the last are clamped to the end
/// values, like a table lookup.
pub fn interpolate(pressures: &[f64], values: &[f64], target: f64) -> Interpolated {
    debug_assert_eq!(pressures.len(), values.len());
    let n = pressures.len().min(values.len());
    if n == 0 {
        return Interpolated {
            value: f64::NAN,
            clamped: true,
        };
    }

    if target >= pressures[0] {
        return Interpolated {
            value: values[0],
            clamped: target > pressures[0],
        };
    }
    if target <= pressures[n - 1] {
        return Interpolated {
            value: values[n - 1],
            clamped: target < pressures[n - 1],
        };
    }

    let upper = pressures[..n]
        .iter()
        .position(|&p| p <= target)
        .unwrap_or(n - 1);
    let lower = upper - 1;
    let (p0, p1) = (pressures[lower], pressures[upper]);
    let weight = (p0 - target) / (p0 - p1);

    Interpolated {
        value: values[lower] + weight * (values[upper] - values[lower]),
        clamped: false,
    }
}

/// Temperature at a pressure (°C)
pub fn temperature_at(profile: &Profile, pressure: f64) -> Interpolated {
    interpolate(&profile.pressures(), &profile.temperatures(), pressure)
}

/// Dewpoint at a pressure (°C)
pub fn dewpoint_at(profile: &Profile, pressure: f64) -> Interpolated {
    interpolate(&profile.pressures(), &profile.dewpoints(), pressure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pressures: &[f64]) -> Profile {
        let levels = pressures
            .iter()
            .map(|&pressure| CanonicalLevel {
                pressure,
                temperature: (pressure - 1000.0) / 10.0 + 20.0,
                dewpoint: (pressure - 1000.0) / 10.0 + 10.0,
                wind_speed: 0.0,
                wind_direction: 0.0,
                altitude: 0.0,
                u_wind: 0.0,
                v_wind: 0.0,
            })
            .collect();
        Profile::new(levels).unwrap()
    }

    #[test]
    fn test_median_filter_keeps_endpoints() {
        let filtered = median_filter(&[1000.0, 990.0, 999.0, 970.0, 960.0], 3);
        assert_eq!(filtered, vec![1000.0, 999.0, 990.0, 970.0, 960.0]);
    }

    #[test]
    fn test_median_filter_is_identity_on_descending_pressures() {
        let pressures = profile(&[1000.0, 975.0, 950.0, 900.0, 850.0, 700.0]).pressures();
        assert_eq!(median_filter(&pressures, MEDIAN_KERNEL), pressures);
    }

    #[test]
    fn test_median_filter_short_input_is_unchanged() {
        assert_eq!(median_filter(&[1000.0, 900.0], 3), vec![1000.0, 900.0]);
    }

    #[test]
    fn test_nearest_index_prefers_first_on_ties() {
        assert_eq!(nearest_index(&[1000.0, 900.0, 800.0], 950.0), Some(0));
        assert_eq!(nearest_index(&[1000.0, 900.0, 800.0], 880.0), Some(1));
        assert_eq!(nearest_index(&[], 880.0), None);
    }

    #[test]
    fn test_selection_is_unique_and_ascending() {
        let profile = profile(&[1010.0, 980.0, 930.0, 860.0, 845.0, 700.0]);
        let selection = VerticalResampler::default().select(&profile);

        assert!(selection.indices.windows(2).all(|w| w[0] < w[1]));
        // 1000 -> 1010, 925 -> 930, 850 and 800 -> 845, 750 and above -> 700
        assert_eq!(selection.indices, vec![0, 2, 4, 5]);
        assert_eq!(selection.pressures, vec![1010.0, 930.0, 845.0, 700.0]);
        assert_eq!(selection.levels(&profile).count(), 4);
    }

    #[test]
    fn test_custom_levels_join_the_selection() {
        let profile = profile(&[1000.0, 975.0, 950.0, 925.0]);
        let standard = VerticalResampler::default().select(&profile);
        let custom =
            VerticalResampler::new(ReferenceLevelSet::with_custom(&[975.0])).select(&profile);

        assert!(!standard.indices.contains(&1));
        assert!(custom.indices.contains(&1));
    }

    #[test]
    fn test_interpolation_is_linear_in_pressure() {
        let profile = profile(&[1000.0, 900.0, 800.0]);
        let t = temperature_at(&profile, 950.0);
        assert!((t.value - 15.0).abs() < 1e-12);
        assert!(!t.clamped);

        let td = dewpoint_at(&profile, 850.0);
        assert!((td.value - (-5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_clamps_at_the_ends() {
        let profile = profile(&[900.0, 800.0]);
        let below = temperature_at(&profile, 950.0);
        assert_eq!(below.value, 10.0);
        assert!(below.clamped);

        let above = temperature_at(&profile, 500.0);
        assert_eq!(above.value, 0.0);
        assert!(above.clamped);

        let exact = temperature_at(&profile, 800.0);
        assert_eq!(exact.value, 0.0);
        assert!(!exact.clamped);
    }
}
