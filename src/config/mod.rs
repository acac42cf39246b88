/*!
 * Configuration Module
 * Simulation parameters, file parsing and validation
 */

mod parser;
pub mod types;

pub use types::{validate_memory_geometry, ConfigError, ConfigResult, SimConfig};

#[cfg(test)]
pub(crate) use types::sample_config;
