/*!
 * Process Types
 * The schedulable unit of work and its read-only snapshots
 */

use crate::core::types::{pages_for, CpuId, Kilobytes, Pid};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use crate::core::errors::ProcessError;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Simulated process
///
/// Instruction counts belong to the scheduler, residency belongs to the
/// memory manager. Both mutate through `pub(crate)` setters so outside code
/// only ever observes a process.
#[derive(Debug, Clone)]
pub struct Process {
    pid: Pid,
    name: String,
    total_instructions: u64,
    remaining_instructions: u64,
    memory_required_kb: Kilobytes,
    page_count: u64,
    in_memory: bool,
    finished: bool,
    delay_counter: u32,
    created_at: OffsetDateTime,
}

impl Process {
    /// Create a process that has not been admitted or scheduled yet
    pub fn new(
        pid: Pid,
        name: impl Into<String>,
        instructions: u64,
        memory_required_kb: Kilobytes,
        frame_size_kb: Kilobytes,
    ) -> Self {
        Self {
            pid,
            name: name.into(),
            total_instructions: instructions,
            remaining_instructions: instructions,
            memory_required_kb,
            page_count: pages_for(memory_required_kb, frame_size_kb),
            in_memory: false,
            finished: false,
            delay_counter: 0,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_instructions(&self) -> u64 {
        self.total_instructions
    }

    pub fn remaining_instructions(&self) -> u64 {
        self.remaining_instructions
    }

    /// Instructions executed so far
    pub fn progress(&self) -> u64 {
        self.total_instructions - self.remaining_instructions
    }

    pub fn memory_required_kb(&self) -> Kilobytes {
        self.memory_required_kb
    }

    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    pub fn in_memory(&self) -> bool {
        self.in_memory
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn delay_counter(&self) -> u32 {
        self.delay_counter
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub(crate) fn set_in_memory(&mut self, resident: bool) {
        self.in_memory = resident;
    }

    /// Advance one tick of execution.
    ///
    /// One instruction completes every `ticks_per_instruction` ticks. Returns
    /// true when that instruction was the last one.
    pub(crate) fn execute_tick(&mut self, ticks_per_instruction: u32) -> bool {
        if self.finished {
            return true;
        }

        self.delay_counter += 1;
        if self.delay_counter >= ticks_per_instruction.max(1) {
            self.remaining_instructions = self.remaining_instructions.saturating_sub(1);
            self.delay_counter = 0;
        }

        if self.remaining_instructions == 0 {
            self.finished = true;
        }
        self.finished
    }
}

/// Where a process currently sits in the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "cpu")]
pub enum ProcessState {
    /// Created but not in the ready queue (never added, or released by stop)
    Idle,
    /// Waiting in the ready queue
    Ready,
    /// Occupying a CPU
    Running(CpuId),
    /// Terminal
    Finished,
}

impl std::fmt::Display for ProcessState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProcessState::Idle => write!(f, "IDLE"),
            ProcessState::Ready => write!(f, "READY"),
            ProcessState::Running(cpu) => write!(f, "RUNNING (core {})", cpu),
            ProcessState::Finished => write!(f, "FINISHED"),
        }
    }
}

/// Read-only process snapshot handed to presentation code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub name: String,
    pub state: ProcessState,
    pub total_instructions: u64,
    pub remaining_instructions: u64,
    pub memory_required_kb: Kilobytes,
    pub page_count: u64,
    pub in_memory: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ProcessInfo {
    pub fn from_process(process: &Process, state: ProcessState) -> Self {
        Self {
            pid: process.pid(),
            name: process.name().to_string(),
            state,
            total_instructions: process.total_instructions(),
            remaining_instructions: process.remaining_instructions(),
            memory_required_kb: process.memory_required_kb(),
            page_count: process.page_count(),
            in_memory: process.in_memory(),
            created_at: process.created_at(),
        }
    }

    pub fn progress(&self) -> u64 {
        self.total_instructions - self.remaining_instructions
    }

    pub fn is_finished(&self) -> bool {
        self.state == ProcessState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_initial_state() {
        let p = Process::new(Pid(1), "p001", 7, 200, 64);
        assert_eq!(p.remaining_instructions(), 7);
        assert_eq!(p.page_count(), 4);
        assert!(!p.in_memory());
        assert!(!p.is_finished());
        assert_eq!(p.progress(), 0);
    }

    #[test]
    fn test_execute_tick_one_instruction_per_tick() {
        let mut p = Process::new(Pid(1), "a", 2, 64, 64);
        assert!(!p.execute_tick(1));
        assert_eq!(p.remaining_instructions(), 1);
        assert!(p.execute_tick(1));
        assert!(p.is_finished());
        assert_eq!(p.remaining_instructions(), 0);
    }

    #[test]
    fn test_zero_delay_behaves_like_one() {
        let mut p = Process::new(Pid(1), "a", 3, 64, 64);
        p.execute_tick(0);
        assert_eq!(p.remaining_instructions(), 2);
    }

    #[test]
    fn test_execute_tick_with_delay() {
        let mut p = Process::new(Pid(1), "a", 2, 64, 64);
        assert!(!p.execute_tick(3));
        assert!(!p.execute_tick(3));
        assert_eq!(p.remaining_instructions(), 2);
        assert_eq!(p.delay_counter(), 2);
        assert!(!p.execute_tick(3));
        assert_eq!(p.remaining_instructions(), 1);
        assert_eq!(p.delay_counter(), 0);
    }

    #[test]
    fn test_process_state_display() {
        assert_eq!(ProcessState::Running(2).to_string(), "RUNNING (core 2)");
        assert_eq!(ProcessState::Finished.to_string(), "FINISHED");
    }
}
