//! Surface-based parcel ascent
//!
//! The surface parcel rises dry adiabatically to its LCL and pseudo-adiabatically
//! above it. Parcel and environment temperatures are compared on the profile
//! pressures with the LCL and every buoyancy sign change inserted, so the
//! positive and negative areas integrate exactly piecewise.

use super::{dry_lapse, lcl, moist_lapse};
use crate::app::models::Profile;
use crate::app::services::resampler::interpolate;
use crate::constants::physics::RD;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Slack for matching inserted levels against layer bounds (hPa)
const LAYER_EPSILON_HPA: f64 = 1e-9;

/// Result of lifting the surface parcel through a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelAnalysis {
    /// Profile pressures (hPa)
    pub pressures: Vec<f64>,
    /// Parcel temperature at each profile pressure (°C)
    pub parcel_temperatures: Vec<f64>,
    /// Environment temperature at each profile pressure (°C)
    pub environment_temperatures: Vec<f64>,
    pub lcl_pressure: f64,
    pub lcl_temperature: f64,
    pub lfc_pressure: Option<f64>,
    pub el_pressure: Option<f64>,
    /// J/kg, never negative
    pub cape: f64,
    /// J/kg, never positive
    pub cin: f64,
}

impl ParcelAnalysis {
    pub fn has_convection(&self) -> bool {
        self.lfc_pressure.is_some()
    }

    /// Fail with `NoConvectionFound` when no LFC exists
    pub fn require_convection(&self) -> Result<()> {
        if self.has_convection() {
            Ok(())
        } else {
            Err(Error::NoConvectionFound)
        }
    }
}

/// Buoyancy sample: pressure and parcel minus environment temperature
#[derive(Debug, Clone, Copy)]
struct Sample {
    pressure: f64,
    excess: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParcelAscentEngine;

impl ParcelAscentEngine {
    pub fn new() -> Self {
        Self
    }

    /// Lift the surface parcel and derive LCL, LFC, EL, CAPE and CIN
    pub fn analyze(&self, profile: &Profile) -> Result<ParcelAnalysis> {
        profile.require_levels(2)?;

        let surface = profile.surface();
        let (p0, t0) = (surface.pressure, surface.temperature);
        let (lcl_pressure, lcl_temperature) = lcl(p0, t0, surface.dewpoint);

        let pressures = profile.pressures();
        let environment_temperatures = profile.temperatures();
        let parcel_temperatures = lift_parcel(&pressures, p0, t0, lcl_pressure, lcl_temperature);

        let samples = buoyancy_samples(
            &pressures,
            &parcel_temperatures,
            &environment_temperatures,
            lcl_pressure,
            lcl_temperature,
        );

        let lfc_pressure = find_lfc(&samples, lcl_pressure);
        let el_pressure = lfc_pressure.and_then(|lfc| find_el(&samples, lfc));

        let (cape, cin) = match lfc_pressure {
            Some(lfc) => {
                let top = el_pressure.unwrap_or(profile.top().pressure);
                (
                    buoyant_area(&samples, lfc, top, f64::max),
                    buoyant_area(&samples, p0, lfc, f64::min),
                )
            }
            None => (0.0, 0.0),
        };

        debug!(
            "Parcel: LCL {:.1} hPa / {:.1} °C, LFC {:?}, EL {:?}, CAPE {:.1}, CIN {:.1}",
            lcl_pressure, lcl_temperature, lfc_pressure, el_pressure, cape, cin
        );

        Ok(ParcelAnalysis {
            pressures,
            parcel_temperatures,
            environment_temperatures,
            lcl_pressure,
            lcl_temperature,
            lfc_pressure,
            el_pressure,
            cape: cape.max(0.0),
            cin: cin.min(0.0),
        })
    }
}

/// Parcel temperature at every pressure, continuing the moist ascent level to level
fn lift_parcel(
    pressures: &[f64],
    p0: f64,
    t0: f64,
    lcl_pressure: f64,
    lcl_temperature: f64,
) -> Vec<f64> {
    let mut moist_state = (lcl_pressure, lcl_temperature);
    pressures
        .iter()
        .map(|&p| {
            if p >= lcl_pressure {
                dry_lapse(p, p0, t0)
            } else {
                let t = moist_lapse(p, moist_state.0, moist_state.1);
                moist_state = (p, t);
                t
            }
        })
        .collect()
}

/// Buoyancy samples with the LCL and all sign changes inserted
fn buoyancy_samples(
    pressures: &[f64],
    parcel: &[f64],
    environment: &[f64],
    lcl_pressure: f64,
    lcl_temperature: f64,
) -> Vec<Sample> {
    let mut samples: Vec<Sample> = pressures
        .iter()
        .zip(parcel.iter().zip(environment))
        .map(|(&pressure, (&tp, &te))| Sample {
            pressure,
            excess: tp - te,
        })
        .collect();

    let top = pressures[pressures.len() - 1];
    let inside = lcl_pressure <= pressures[0] && lcl_pressure >= top;
    if inside && !pressures.contains(&lcl_pressure) {
        let environment_at_lcl = interpolate(pressures, environment, lcl_pressure).value;
        let position = samples.partition_point(|s| s.pressure > lcl_pressure);
        samples.insert(
            position,
            Sample {
                pressure: lcl_pressure,
                excess: lcl_temperature - environment_at_lcl,
            },
        );
    }

    let mut refined = Vec::with_capacity(samples.len() * 2);
    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        refined.push(a);
        if a.excess * b.excess < 0.0 {
            refined.push(Sample {
                pressure: zero_crossing(a, b),
                excess: 0.0,
            });
        }
    }
    if let Some(last) = samples.last() {
        refined.push(*last);
    }
    refined
}

/// Pressure where buoyancy reaches zero between two samples, linear in ln p
fn zero_crossing(a: Sample, b: Sample) -> f64 {
    if a.excess == b.excess {
        return a.pressure;
    }
    let fraction = a.excess / (a.excess - b.excess);
    (a.pressure.ln() + fraction * (b.pressure.ln() - a.pressure.ln())).exp()
}

/// First level at or above the LCL where the parcel becomes warmer than the
/// environment
fn find_lfc(samples: &[Sample], lcl_pressure: f64) -> Option<f64> {
    let start = samples
        .iter()
        .position(|s| s.pressure <= lcl_pressure + LAYER_EPSILON_HPA)?;

    // LCL outside the profile: no saturated ascent to test
    if (samples[start].pressure - lcl_pressure).abs() > LAYER_EPSILON_HPA {
        return None;
    }
    if samples[start].excess > 0.0 {
        return Some(lcl_pressure);
    }

    samples[start..]
        .windows(2)
        .find(|pair| pair[0].excess <= 0.0 && pair[1].excess > 0.0)
        .map(|pair| zero_crossing(pair[0], pair[1]))
}

/// Last level above the LFC where the parcel turns colder than the environment
fn find_el(samples: &[Sample], lfc_pressure: f64) -> Option<f64> {
    samples
        .windows(2)
        .filter(|pair| pair[0].pressure <= lfc_pressure + LAYER_EPSILON_HPA)
        .filter(|pair| pair[0].excess > 0.0 && pair[1].excess <= 0.0)
        .map(|pair| zero_crossing(pair[0], pair[1]))
        .last()
}

/// Rd ∫ clip(Tp − Te) d ln p between two pressures (bottom > top)
fn buoyant_area(samples: &[Sample], bottom: f64, top: f64, clip: fn(f64, f64) -> f64) -> f64 {
    let integral: f64 = samples
        .windows(2)
        .filter(|pair| {
            pair[0].pressure <= bottom + LAYER_EPSILON_HPA
                && pair[1].pressure >= top - LAYER_EPSILON_HPA
        })
        .map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            let mean = (clip(a.excess, 0.0) + clip(b.excess, 0.0)) / 2.0;
            mean * (a.pressure.ln() - b.pressure.ln())
        })
        .sum();
    RD * integral
}
