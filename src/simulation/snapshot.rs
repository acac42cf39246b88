/*!
 * Simulation Snapshot
 * Point-in-time view of scheduler, memory and processes for presentation
 */

use crate::config::SimConfig;
use crate::core::types::{Pid, Tick};
use crate::memory::MemoryStats;
use crate::process::ProcessInfo;
use crate::scheduler::{CpuSnapshot, SchedulerStats};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Consistent copy of the whole simulation state
///
/// Taken between operations by the owning task, so no tick is ever
/// half-applied in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationSnapshot {
    pub tick: Tick,
    #[serde(with = "time::serde::rfc3339")]
    pub taken_at: OffsetDateTime,
    pub running: bool,
    pub config: SimConfig,
    pub cpus: Vec<CpuSnapshot>,
    pub ready_queue: Vec<Pid>,
    pub scheduler: SchedulerStats,
    pub memory: MemoryStats,
    /// Every process ever created, ordered by pid
    pub processes: Vec<ProcessInfo>,
}

impl SimulationSnapshot {
    pub fn cpu_count(&self) -> usize {
        self.cpus.len()
    }

    /// CPUs currently holding a process
    pub fn active_cpus(&self) -> usize {
        self.cpus.iter().filter(|cpu| cpu.running.is_some()).count()
    }

    /// Active CPUs over total CPUs, in percent
    pub fn cpu_utilization(&self) -> f64 {
        if self.cpus.is_empty() {
            return 0.0;
        }
        self.active_cpus() as f64 / self.cpus.len() as f64 * 100.0
    }

    /// Processes that have not finished, by pid
    pub fn unfinished(&self) -> impl Iterator<Item = &ProcessInfo> {
        self.processes.iter().filter(|p| !p.is_finished())
    }

    pub fn finished(&self) -> impl Iterator<Item = &ProcessInfo> {
        self.processes.iter().filter(|p| p.is_finished())
    }

    pub fn find(&self, name: &str) -> Option<&ProcessInfo> {
        self.processes.iter().find(|p| p.name == name)
    }
}
