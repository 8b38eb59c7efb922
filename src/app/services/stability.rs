//! Fire-weather stability indices
//!
//! Haines Index, mixing height and the surface readout shown next to the
//! skew-T, plus the calculator that bundles them with the parcel results into
//! an [`IndexSet`].
//!
//! # References
//!
//! - Haines, D.A. (1988). "A lower atmosphere severity index for wildland fires."
//!   National Weather Digest, 13(2), 23-27.

use crate::app::models::{HainesElevation, IndexSet, Profile, SurfaceMetrics};
use crate::app::services::resampler::{dewpoint_at, temperature_at};
use crate::app::services::thermo::{ParcelAnalysis, dry_lapse, relative_humidity};
use crate::constants::METERS_PER_HPA;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Haines Index with the terms that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HainesResult {
    pub index: u8,
    pub elevation: HainesElevation,
    /// T(lower) − T(middle), °C
    pub stability: f64,
    /// T(middle) − Td(middle), °C
    pub moisture: f64,
}

/// Stability term from the lower-to-middle temperature difference
///
/// ```text
/// low:       A ≤ 3 → 1, A ≤ 6 → 2, else 3
/// mid, high: A ≤ 4 → 1, A ≤ 8 → 2, else 3
/// ```
pub fn stability_term(elevation: HainesElevation, a: f64) -> u8 {
    let (first, second) = match elevation {
        HainesElevation::Low => (3.0, 6.0),
        HainesElevation::Mid | HainesElevation::High => (4.0, 8.0),
    };
    if a <= first {
        1
    } else if a <= second {
        2
    } else {
        3
    }
}

/// Moisture term from the middle-level dew-point depression
///
/// B ≤ 1 → 1, B ≤ 5 → 2, else 3, for every elevation class.
pub fn moisture_term(b: f64) -> u8 {
    if b <= 1.0 {
        1
    } else if b <= 5.0 {
        2
    } else {
        3
    }
}

/// Haines Index (2-6) from its two terms
#[must_use]
pub fn haines_from_terms(elevation: HainesElevation, a: f64, b: f64) -> u8 {
    stability_term(elevation, a) + moisture_term(b)
}

/// Haines Index for a profile
///
/// Temperature at the lower and middle levels and dewpoint at the middle level
/// are each interpolated independently. Levels outside the profile take the
/// nearest end value and are reported at warn level.
pub fn haines_index(profile: &Profile, elevation: HainesElevation) -> Result<HainesResult> {
    profile.require_levels(2)?;
    let [lower, middle, _upper] = elevation.levels();

    let t_lower = temperature_at(profile, lower);
    let t_middle = temperature_at(profile, middle);
    let td_middle = dewpoint_at(profile, middle);

    if t_lower.clamped || t_middle.clamped || td_middle.clamped {
        warn!(
            "Haines {} levels {} / {} hPa outside profile ({:.1} to {:.1} hPa); end values used",
            elevation,
            lower,
            middle,
            profile.surface().pressure,
            profile.top().pressure
        );
    }

    let stability = t_lower.value - t_middle.value;
    let moisture = t_middle.value - td_middle.value;
    let index = haines_from_terms(elevation, stability, moisture);

    debug!(
        "Haines ({}): A = {:.2}, B = {:.2}, index {}",
        elevation, stability, moisture, index
    );

    Ok(HainesResult {
        index,
        elevation,
        stability,
        moisture,
    })
}

/// Mixing height estimate (m above the surface)
///
/// Picks the level above the surface whose temperature is closest to the dry
/// adiabat through the surface state and converts its pressure drop to height
/// at 8.4 m/hPa. Coarse by nature; ties go to the lower level.
pub fn mixing_height(profile: &Profile) -> Result<f64> {
    profile.require_levels(2)?;
    let surface = profile.surface();

    let closest = profile.levels()[1..]
        .iter()
        .min_by(|a, b| {
            adiabat_distance(a.pressure, a.temperature, surface.pressure, surface.temperature)
                .total_cmp(&adiabat_distance(
                    b.pressure,
                    b.temperature,
                    surface.pressure,
                    surface.temperature,
                ))
        })
        .map(|level| level.pressure)
        .unwrap_or(surface.pressure);

    Ok((surface.pressure - closest) * METERS_PER_HPA)
}

fn adiabat_distance(pressure: f64, temperature: f64, p0: f64, t0: f64) -> f64 {
    (temperature - dry_lapse(pressure, p0, t0)).abs()
}

/// Surface readout: wind from the u/v components, humidity, depression
pub fn surface_metrics(profile: &Profile) -> SurfaceMetrics {
    let surface = profile.surface();
    let (u, v) = (surface.u_wind, surface.v_wind);

    SurfaceMetrics {
        pressure: surface.pressure,
        temperature: surface.temperature,
        dewpoint: surface.dewpoint,
        wind_speed: u.hypot(v),
        wind_direction: (270.0 - v.atan2(u).to_degrees()).rem_euclid(360.0),
        relative_humidity: relative_humidity(surface.temperature, surface.dewpoint),
        dewpoint_depression: surface.dewpoint_depression(),
    }
}

/// Computes the full index set for a profile
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilityIndexCalculator {
    elevation: HainesElevation,
}

impl StabilityIndexCalculator {
    pub fn new(elevation: HainesElevation) -> Self {
        Self { elevation }
    }

    pub fn elevation(&self) -> HainesElevation {
        self.elevation
    }

    /// Bundle parcel results with Haines, mixing height and surface metrics
    pub fn compute(&self, profile: &Profile, parcel: &ParcelAnalysis) -> Result<IndexSet> {
        let haines = haines_index(profile, self.elevation)?;

        Ok(IndexSet {
            cape: parcel.cape,
            cin: parcel.cin,
            lcl_pressure: parcel.lcl_pressure,
            lcl_temperature: parcel.lcl_temperature,
            lfc_pressure: parcel.lfc_pressure,
            el_pressure: parcel.el_pressure,
            haines_index: haines.index,
            haines_elevation: haines.elevation,
            mixing_height: mixing_height(profile)?,
            surface: surface_metrics(profile),
        })
    }
}
