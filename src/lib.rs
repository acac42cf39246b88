/*!
 * Scheduler Simulator Kernel Library
 * Tick-driven multi-core CPU scheduling over a flat or paged memory manager
 */

pub mod config;
pub mod core;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod shell;
pub mod simulation;

// Re-exports
pub use config::{ConfigError, SimConfig};
pub use core::{KernelError, KernelResult, Pid};
pub use memory::{Allocator, MemoryError, MemoryInfo, MemoryManager, MemoryMode, MemoryStats};
pub use monitoring::init_tracing;
pub use process::{Process, ProcessError, ProcessFactory, ProcessInfo, ProcessState, ProcessTable};
pub use scheduler::{Scheduler, SchedulerError, SchedulerPolicy, SchedulerStats, TickReport};
pub use shell::{Outcome, Shell};
pub use simulation::{Simulation, SimulationSnapshot, SimulationTask, SimulationTiming};
