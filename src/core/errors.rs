/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export domain errors owned by their modules
pub use crate::config::ConfigError;
pub use crate::memory::MemoryError;

/// Process-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {0} not found")]
    #[diagnostic(
        code(process::not_found),
        help("The process may have finished or never existed. Check `screen -ls`.")
    )]
    NotFound(String),

    #[error("Process {0} not found")]
    #[diagnostic(code(process::pid_not_found))]
    PidNotFound(Pid),

    #[error("Process name already in use: {0}")]
    #[diagnostic(
        code(process::duplicate_name),
        help("Process names are unique for the lifetime of the simulation.")
    )]
    DuplicateName(String),

    #[error("Invalid process name: {0:?}")]
    #[diagnostic(code(process::invalid_name), help("Names must be non-empty and contain no whitespace."))]
    InvalidName(String),
}

/// Scheduler-related errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Process {0} not found")]
    #[diagnostic(code(scheduler::process_not_found))]
    ProcessNotFound(Pid),

    #[error("Process {0} has already finished")]
    #[diagnostic(
        code(scheduler::process_finished),
        help("Finished processes are never re-enqueued.")
    )]
    ProcessFinished(Pid),

    #[error("Process {0} is already queued or running")]
    #[diagnostic(code(scheduler::already_scheduled))]
    AlreadyScheduled(Pid),
}

/// Unified simulator error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Memory error: {0}")]
    #[diagnostic(transparent)]
    Memory(#[from] MemoryError),

    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Simulation task unavailable: {0}")]
    #[diagnostic(
        code(kernel::task_unavailable),
        help("The simulation task has shut down. Re-run `initialize`.")
    )]
    TaskUnavailable(String),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(kernel::io_error),
        help("Filesystem operation failed. Check file permissions and disk space.")
    )]
    Io(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(kernel::serialization_error))]
    Serialization(String),
}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        KernelError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::Serialization(err.to_string())
    }
}
