/*!
 * CPU Unit
 * One execution slot in the fixed core array
 */

use super::types::CpuSnapshot;
use crate::core::types::{CpuId, Pid};

#[derive(Debug, Clone)]
pub(crate) struct Cpu {
    pub(crate) id: CpuId,
    pub(crate) running: Option<Pid>,
    /// Ticks left before round-robin preemption; unused under FCFS
    pub(crate) quantum_left: u32,
    /// Executed an instruction tick during the last scheduler tick
    pub(crate) active: bool,
    pub(crate) active_ticks: u64,
}

impl Cpu {
    pub(crate) fn new(id: CpuId) -> Self {
        Self {
            id,
            running: None,
            quantum_left: 0,
            active: false,
            active_ticks: 0,
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.running.is_none()
    }

    pub(crate) fn assign(&mut self, pid: Pid, quantum: u32) {
        self.running = Some(pid);
        self.quantum_left = quantum;
    }

    pub(crate) fn release(&mut self) -> Option<Pid> {
        self.quantum_left = 0;
        self.running.take()
    }

    pub(crate) fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            id: self.id,
            running: self.running,
            quantum_left: self.quantum_left,
            active: self.active,
            active_ticks: self.active_ticks,
        }
    }
}
