/*!
 * Scheduler Types
 * Domain types for tick-driven scheduling
 */

use crate::core::types::{CpuId, Pid, Tick};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub use crate::core::errors::SchedulerError;

/// Scheduler operation result
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduling algorithm, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerPolicy {
    /// First-come first-served; a process keeps its CPU until it finishes
    Fcfs,
    /// Round-robin with a fixed tick quantum
    RoundRobin,
}

impl SchedulerPolicy {
    /// Convert to the configuration spelling
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fcfs => "fcfs",
            Self::RoundRobin => "rr",
        }
    }
}

impl FromStr for SchedulerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fcfs" | "fifo" => Ok(Self::Fcfs),
            "rr" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            _ => Err(format!("Invalid policy '{}'. Valid: fcfs, rr", s)),
        }
    }
}

impl std::fmt::Display for SchedulerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SchedulerPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SchedulerPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Cumulative scheduler counters
///
/// Bookkeeping only; nothing here feeds back into dispatch decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    pub total_ticks: Tick,
    /// CPU-ticks spent executing a process
    pub active_ticks: u64,
    /// CPU-ticks with nothing to run
    pub idle_ticks: u64,
    pub dispatches: u64,
    pub preemptions: u64,
    pub completions: u64,
    /// Dispatch attempts deferred because the process could not be re-admitted
    pub deferred_admissions: u64,
}

/// Read-only view of one CPU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CpuSnapshot {
    pub id: CpuId,
    pub running: Option<Pid>,
    pub quantum_left: u32,
    pub active: bool,
    pub active_ticks: u64,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    /// (cpu, pid) pairs dispatched this tick, CPU index ascending
    pub dispatched: Vec<(CpuId, Pid)>,
    pub completed: Vec<Pid>,
    pub preempted: Vec<Pid>,
    pub idle_cpus: usize,
}
