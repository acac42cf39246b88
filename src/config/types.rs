/*!
 * Configuration Types
 * Validated simulation parameters and configuration errors
 */

use crate::core::limits::{BATCH_FREQUENCY_UNIT, MAX_CPUS};
use crate::core::types::Kilobytes;
use crate::scheduler::SchedulerPolicy;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Configuration result
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
///
/// Every variant is a construction-time failure: nothing is built from a
/// configuration that produced one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Cannot read configuration {path}: {message}")]
    #[diagnostic(code(config::io), help("Create the file or pass another path."))]
    Io { path: String, message: String },

    #[error("Malformed line {line}: {content:?} (expected `KEY VALUE`)")]
    #[diagnostic(code(config::malformed_line))]
    MalformedLine { line: usize, content: String },

    #[error("Missing configuration key: {0}")]
    #[diagnostic(code(config::missing_key))]
    MissingKey(String),

    #[error("Invalid value {value:?} for {key}: {reason}")]
    #[diagnostic(code(config::invalid_value))]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration for {field}: {reason}")]
    #[diagnostic(
        code(config::invariant_violated),
        help("Check the min/max ranges and that FRAME_SIZE evenly divides TOTAL_MEMORY.")
    )]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    pub num_cpu: usize,
    pub scheduler: SchedulerPolicy,
    /// Round-robin time slice in ticks (ignored under FCFS)
    pub quantum: u32,
    /// Seconds between generated batch processes
    pub batch_frequency: u64,
    pub min_instructions: u64,
    pub max_instructions: u64,
    /// Ticks spent per instruction; 0 and 1 both mean one instruction per tick
    pub delay_per_exec: u32,
    pub total_memory_kb: Kilobytes,
    pub frame_size_kb: Kilobytes,
    pub min_memory_kb: Kilobytes,
    pub max_memory_kb: Kilobytes,
}

impl SimConfig {
    /// Check every invariant the scheduler and memory manager rely on
    pub fn validate(&self) -> ConfigResult<()> {
        if self.num_cpu == 0 || self.num_cpu > MAX_CPUS {
            return Err(ConfigError::invalid(
                "NUM_CPU",
                format!("must be between 1 and {}", MAX_CPUS),
            ));
        }

        if self.scheduler == SchedulerPolicy::RoundRobin && self.quantum == 0 {
            return Err(ConfigError::invalid(
                "TIME_QUANTUM",
                "round-robin needs a quantum of at least 1 tick",
            ));
        }

        if self.batch_frequency == 0 {
            return Err(ConfigError::invalid("BATCH_FREQUENCY", "must be at least 1"));
        }

        if self.min_instructions == 0 || self.min_instructions > self.max_instructions {
            return Err(ConfigError::invalid(
                "MIN_INSTRUCTIONS",
                format!(
                    "need 1 <= min ({}) <= max ({})",
                    self.min_instructions, self.max_instructions
                ),
            ));
        }

        validate_memory_geometry(self.total_memory_kb, self.frame_size_kb)?;

        if self.min_memory_kb == 0
            || self.min_memory_kb > self.max_memory_kb
            || self.max_memory_kb > self.total_memory_kb
        {
            return Err(ConfigError::invalid(
                "MIN_MEMORY_PER_PROCESS",
                format!(
                    "need 1 <= min ({}) <= max ({}) <= total memory ({})",
                    self.min_memory_kb, self.max_memory_kb, self.total_memory_kb
                ),
            ));
        }

        Ok(())
    }

    /// Inclusive range instruction counts are drawn from
    pub fn instruction_range(&self) -> RangeInclusive<u64> {
        self.min_instructions..=self.max_instructions
    }

    /// Inclusive range process footprints are drawn from
    pub fn memory_range(&self) -> RangeInclusive<Kilobytes> {
        self.min_memory_kb..=self.max_memory_kb
    }

    /// Wall-clock interval between generated batch processes
    pub fn batch_interval(&self) -> Duration {
        BATCH_FREQUENCY_UNIT.saturating_mul(self.batch_frequency.min(u32::MAX as u64) as u32)
    }
}

/// Frame size must be positive, no larger than the pool, and divide it evenly
pub fn validate_memory_geometry(total_kb: Kilobytes, frame_size_kb: Kilobytes) -> ConfigResult<()> {
    if total_kb == 0 {
        return Err(ConfigError::invalid("TOTAL_MEMORY", "must be positive"));
    }
    if frame_size_kb == 0 {
        return Err(ConfigError::invalid("FRAME_SIZE", "must be positive"));
    }
    if frame_size_kb > total_kb {
        return Err(ConfigError::invalid(
            "FRAME_SIZE",
            format!("{} KB exceeds total memory {} KB", frame_size_kb, total_kb),
        ));
    }
    if total_kb % frame_size_kb != 0 {
        return Err(ConfigError::invalid(
            "FRAME_SIZE",
            format!("{} KB does not evenly divide {} KB", frame_size_kb, total_kb),
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_config() -> SimConfig {
    SimConfig {
        num_cpu: 4,
        scheduler: SchedulerPolicy::Fcfs,
        quantum: 3,
        batch_frequency: 5,
        min_instructions: 5,
        max_instructions: 10,
        delay_per_exec: 2,
        total_memory_kb: 1024,
        frame_size_kb: 1024,
        min_memory_kb: 128,
        max_memory_kb: 256,
    }
}
