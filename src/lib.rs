//! Fire Sounding Library
//!
//! A Rust library for turning raw radiosonde (weather balloon) telemetry into a
//! canonical atmospheric profile and the stability indices used in severe-weather
//! and wildland fire-behaviour forecasting.
//!
//! This library provides tools for:
//! - Parsing vendor-specific delimited instrument exports (UTF-8 or Latin-1)
//! - Cleaning dash/whitespace garbage into a -99.9 sentinel and typed numbers
//! - Harmonizing vendor columns and units onto one canonical unit system
//! - Decomposing wind into u/v components
//! - Assembling a sentinel-free, deduplicated, pressure-descending profile
//! - Selecting standard reference levels for barb and skew-T annotation
//! - Lifting a surface parcel for LCL, LFC, EL, CAPE and CIN
//! - Haines Index, mixing height and surface-derived metrics
//! - Writing the profile table and an index report

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod hodograph;
        pub mod output_writer;
        pub mod pipeline;
        pub mod profile_builder;
        pub mod resampler;
        pub mod sounding_parser;
        pub mod stability;
        pub mod thermo;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
}

// Re-export commonly used types
pub use app::models::{CanonicalLevel, HainesElevation, IndexSet, Profile, ReferenceLevelSet};
pub use app::services::pipeline::{SoundingPipeline, SoundingResult};
pub use config::Config;

/// Result type alias for sounding processing
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sounding processing operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Input text could not be decoded with the declared encoding
    #[error("Encoding error ({encoding}): {message}")]
    Encoding { encoding: String, message: String },

    /// Delimited text could not be read
    #[error("CSV parsing error: {message}")]
    CsvParsing {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// A column required by the instrument schema is missing from the header
    #[error("Schema mismatch for format '{format}': required column '{column}' ({field}) not found in header")]
    SchemaMismatch {
        format: String,
        field: String,
        column: String,
    },

    /// A configured column mapping references a column absent from the header
    #[error("Unknown column '{column}' mapped to {field}: not present in parsed header")]
    UnknownColumn { column: String, field: String },

    /// A field could not be coerced to a number
    #[error("Invalid numeric field on line {line}, column '{column}': '{raw}'")]
    InvalidNumericField {
        line: usize,
        column: String,
        raw: String,
    },

    /// Every record was filtered out while assembling the profile
    #[error("Empty profile: none of {records_seen} records survived sentinel filtering")]
    EmptyProfile { records_seen: usize },

    /// The input holds more levels than the configured bound
    #[error("Profile too large: {levels} levels exceeds limit of {limit}")]
    ProfileTooLarge { levels: usize, limit: usize },

    /// A profile violates its ordering or sentinel invariants
    #[error("Invalid profile: {reason}")]
    InvalidProfile { reason: String },

    /// Not enough levels for a thermodynamic computation
    #[error("Insufficient levels: {levels} available, at least {required} required")]
    InsufficientLevels { levels: usize, required: usize },

    /// The lifted parcel never becomes positively buoyant above the LCL
    #[error("No convection found: parcel never warmer than environment above the LCL")]
    NoConvectionFound,

    /// Instrument format identifier not known
    #[error("Unknown instrument format: {name}")]
    UnknownFormat { name: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Output serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },

    /// One or more soundings in a batch failed
    #[error("{failed} of {total} soundings failed")]
    BatchFailed { failed: usize, total: usize },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an encoding error
    pub fn encoding(encoding: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding {
            encoding: encoding.into(),
            message: message.into(),
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(message: impl Into<String>, source: Option<csv::Error>) -> Self {
        Self::CsvParsing {
            message: message.into(),
            source,
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(
        format: impl Into<String>,
        field: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self::SchemaMismatch {
            format: format.into(),
            field: field.into(),
            column: column.into(),
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(column: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            field: field.into(),
        }
    }

    /// Create an invalid numeric field error
    pub fn invalid_numeric(line: usize, column: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidNumericField {
            line,
            column: column.into(),
            raw: raw.into(),
        }
    }

    /// Create an invalid profile error
    pub fn invalid_profile(reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            reason: reason.into(),
        }
    }

    /// Create an unknown format error
    pub fn unknown_format(name: impl Into<String>) -> Self {
        Self::UnknownFormat { name: name.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }

    /// True for schema and configuration problems that affect every file of a format
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaMismatch { .. }
                | Self::UnknownColumn { .. }
                | Self::UnknownFormat { .. }
                | Self::Configuration { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<polars::error::PolarsError> for Error {
    fn from(error: polars::error::PolarsError) -> Self {
        Self::Serialization {
            message: "Profile table write failed".to_string(),
            source: Box::new(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: Box::new(error),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid TOML configuration: {}", error),
        }
    }
}
