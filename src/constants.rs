//! Application constants for the sounding processor
//!
//! This module contains the sentinel convention, physical constants, standard
//! pressure levels and default values used throughout the processor.

// =============================================================================
// Missing Value Convention
// =============================================================================

/// Marker for a missing or invalid observation
pub const SENTINEL: f64 = -99.9;

/// Exact sentinel comparison (no tolerance, the value is written literally)
#[inline]
pub fn is_sentinel(value: f64) -> bool {
    value == SENTINEL
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Thermodynamic constants for dry and moist air
pub mod physics {
    /// Gas constant for dry air (J kg-1 K-1)
    pub const RD: f64 = 287.04749;

    /// Specific heat of dry air at constant pressure (J kg-1 K-1)
    pub const CP_D: f64 = 1005.7;

    /// Poisson constant Rd / Cp
    pub const KAPPA: f64 = RD / CP_D;

    /// Latent heat of vaporization (J kg-1)
    pub const LV: f64 = 2.501e6;

    /// Ratio of molecular weights of water vapour and dry air
    pub const EPSILON: f64 = 0.621_957;

    /// Offset between Celsius and Kelvin
    pub const ZERO_CELSIUS_K: f64 = 273.15;

    /// Bolton (1980) saturation vapour pressure coefficients (hPa, °C)
    pub const BOLTON_E0_HPA: f64 = 6.112;
    pub const BOLTON_A: f64 = 17.67;
    pub const BOLTON_B: f64 = 243.5;

    /// Magnus coefficients used for the surface relative humidity readout
    pub const MAGNUS_A: f64 = 17.625;
    pub const MAGNUS_B: f64 = 243.04;
}

// =============================================================================
// Pressure Levels
// =============================================================================

/// RAOB standard levels plus the upper-air levels used for barb annotation (hPa)
pub const STANDARD_LEVELS_HPA: &[f64] = &[
    1000.0, 925.0, 850.0, 800.0, 750.0, 700.0, 650.0, 600.0, 550.0, 500.0, 450.0, 400.0, 350.0,
    300.0, 250.0, 200.0, 150.0, 100.0, 70.0, 50.0, 30.0, 20.0, 10.0,
];

/// Haines Index pressure triples (lower, middle, upper) in hPa
pub mod haines_levels {
    pub const LOW: [f64; 3] = [950.0, 850.0, 700.0];
    pub const MID: [f64; 3] = [850.0, 700.0, 500.0];
    pub const HIGH: [f64; 3] = [700.0, 500.0, 400.0];
}

/// Empirical metres per hPa near the surface used by the mixing-height estimate
pub const METERS_PER_HPA: f64 = 8.4;

// =============================================================================
// Processing Configuration Defaults
// =============================================================================

/// Built-in instrument format used when none is configured
pub const DEFAULT_FORMAT: &str = "windsond";

/// Upper bound on levels accepted per sounding
pub const DEFAULT_MAX_LEVELS: usize = 50_000;

/// Median filter kernel applied to pressure before reference selection
pub const MEDIAN_KERNEL: usize = 3;

/// Wind components are rounded to this many decimal places
pub const WIND_DECIMALS: i32 = 3;

/// Hodograph smoothing window (samples)
pub const DEFAULT_HODOGRAPH_WINDOW: usize = 50;

/// Hodograph decimation (keep every n-th smoothed sample per band)
pub const DEFAULT_HODOGRAPH_STRIDE: usize = 25;

/// Hodograph altitude bands (lower m, upper m), half-open
pub const DEFAULT_HODOGRAPH_BANDS: &[(f64, f64)] = &[
    (0.0, 500.0),
    (500.0, 3000.0),
    (3000.0, 7000.0),
    (7000.0, 10000.0),
];

/// Moist adiabat integration step ceiling (hPa)
pub const MOIST_STEP_HPA: f64 = 5.0;

/// LCL iteration tolerance (hPa) and iteration cap
pub const LCL_TOLERANCE_HPA: f64 = 1e-4;
pub const LCL_MAX_ITERATIONS: usize = 50;

/// Maximum number of parallel workers accepted on the command line
pub const MAX_WORKERS: usize = 64;

/// File extensions picked up when an input directory is walked
pub const SOUNDING_EXTENSIONS: &[&str] = &["txt", "tsv", "csv", "dat"];

/// Environment variable overrides
pub mod env {
    pub const FORMAT: &str = "FIRESOUNDING_FORMAT";
    pub const HAINES: &str = "FIRESOUNDING_HAINES";
    pub const OUTPUT_DIR: &str = "FIRESOUNDING_OUTPUT_DIR";
}
