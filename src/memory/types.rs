/*!
 * Memory Types
 * Common types for memory management
 */

use crate::core::limits::{MEMORY_PRESSURE_CRITICAL, MEMORY_PRESSURE_HIGH};
use crate::core::types::{Kilobytes, Pid};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MemoryError {
    #[error("Out of memory: process {pid} needs {requested_kb} KB ({requested_frames} frames), {available_kb} KB free of {total_kb} KB")]
    #[diagnostic(
        code(memory::out_of_memory),
        help("Admission was denied; the process stays outside memory.")
    )]
    OutOfMemory {
        pid: Pid,
        requested_kb: Kilobytes,
        requested_frames: u64,
        available_kb: Kilobytes,
        total_kb: Kilobytes,
    },

    #[error("Process {0} is not known to the memory manager")]
    #[diagnostic(code(memory::unknown_process))]
    UnknownProcess(Pid),

    #[error("Process {0} has finished and cannot be admitted")]
    #[diagnostic(code(memory::process_finished))]
    ProcessFinished(Pid),
}

/// Allocation mode, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryMode {
    /// One frame spans the whole pool; only a KB counter is kept
    Flat,
    /// Pool split into fixed-size frames tracked in a bitmap
    Paging,
}

impl std::fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryMode::Flat => write!(f, "flat"),
            MemoryMode::Paging => write!(f, "paging"),
        }
    }
}

/// Outcome of a successful admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    pub pid: Pid,
    /// Frames reserved for the process (empty in flat mode)
    pub frames: Vec<usize>,
    /// Processes swapped out to make room, oldest first
    pub evicted: Vec<Pid>,
    /// True when the process was already resident and nothing changed
    pub already_resident: bool,
}

/// Memory statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub mode: MemoryMode,
    pub total_kb: Kilobytes,
    pub used_kb: Kilobytes,
    pub free_kb: Kilobytes,
    pub frame_size_kb: Kilobytes,
    pub total_frames: usize,
    pub free_frames: usize,
    pub paged_in: u64,
    pub paged_out: u64,
    pub resident_processes: usize,
    pub tracked_processes: usize,
    pub usage_percentage: f64,
}

impl MemoryStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        if self.usage_percentage >= MEMORY_PRESSURE_CRITICAL {
            MemoryPressure::Critical
        } else if self.usage_percentage >= MEMORY_PRESSURE_HIGH {
            MemoryPressure::High
        } else if self.usage_percentage >= 60.0 {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_at(usage_percentage: f64) -> MemoryStats {
        MemoryStats {
            mode: MemoryMode::Flat,
            total_kb: 100,
            used_kb: usage_percentage as u64,
            free_kb: 100 - usage_percentage as u64,
            frame_size_kb: 100,
            total_frames: 1,
            free_frames: 0,
            paged_in: 0,
            paged_out: 0,
            resident_processes: 0,
            tracked_processes: 0,
            usage_percentage,
        }
    }

    #[test]
    fn test_memory_pressure_levels() {
        assert_eq!(stats_at(10.0).memory_pressure(), MemoryPressure::Low);
        assert_eq!(stats_at(65.0).memory_pressure(), MemoryPressure::Medium);
        assert_eq!(stats_at(85.0).memory_pressure(), MemoryPressure::High);
        assert_eq!(stats_at(99.0).memory_pressure(), MemoryPressure::Critical);
    }

    #[test]
    fn test_out_of_memory_message() {
        let err = MemoryError::OutOfMemory {
            pid: Pid(3),
            requested_kb: 300,
            requested_frames: 1,
            available_kb: 56,
            total_kb: 256,
        };
        assert_eq!(
            err.to_string(),
            "Out of memory: process 3 needs 300 KB (1 frames), 56 KB free of 256 KB"
        );
    }
}
