/*!
 * Scheduler Module
 * Tick-driven multi-core CPU scheduling
 */

mod core;
mod cpu;
pub mod types;

// Re-export public API
pub use self::core::Scheduler;
pub use types::{
    CpuSnapshot, SchedulerError, SchedulerPolicy, SchedulerResult, SchedulerStats, TickReport,
};
