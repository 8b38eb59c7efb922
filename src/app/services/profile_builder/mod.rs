//! Profile assembly from decomposed records
//!
//! Turns the flat stream of canonical levels coming out of the instrument parser
//! into a [`Profile`](crate::app::models::Profile): sentinel-free, one level per
//! pressure, strictly descending.
//!
//! # Architecture
//!
//! - [`assembler`] - ProfileAssembler and the assembly pipeline
//! - [`sentinel_filter`] - Drops records with a missing checked field
//! - [`deduplication`] - First-seen-wins pressure deduplication
//! - [`stats`] - Assembly statistics and result structure
//!
//! # Processing Pipeline
//!
//! 1. **Size check**: refuse inputs above the configured level bound
//! 2. **Sentinel filtering**: pressure, temperature, dewpoint, u_wind and v_wind
//! 3. **Deduplication**: the first record at a pressure wins, in input order
//! 4. **Ordering**: sort by descending pressure
//!
//! # Example Usage
//!
//! ```rust
//! use firesounding::app::services::profile_builder::ProfileAssembler;
//!
//! # fn example(levels: Vec<firesounding::CanonicalLevel>) -> firesounding::Result<()> {
//! let assembler = ProfileAssembler::new(50_000);
//! let result = assembler.assemble(levels)?;
//! println!("{}", result.stats.summary());
//! println!("Surface pressure {} hPa", result.profile.surface().pressure);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod deduplication;
pub mod sentinel_filter;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use assembler::ProfileAssembler;
pub use deduplication::deduplicate_pressures;
pub use sentinel_filter::{drop_sentinel_levels, passes_sentinel_filter};
pub use stats::{AssemblyResult, AssemblyStats};
