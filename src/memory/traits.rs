/*!
 * Memory Traits
 * Memory management abstractions used by the scheduler
 */

use super::types::*;
use crate::core::types::Pid;
use crate::process::ProcessTable;

/// Residency control consumed by the scheduler
///
/// The scheduler re-admits non-resident processes at dispatch time and
/// releases memory when a process finishes or is dropped by `stop`.
pub trait Allocator {
    /// Make `pid` resident, evicting others if needed
    fn allocate(&mut self, processes: &mut ProcessTable, pid: Pid) -> MemoryResult<Admission>;

    /// Release everything held for `pid`; no-op if nothing is held
    fn deallocate(&mut self, processes: &mut ProcessTable, pid: Pid) -> bool;
}

/// Memory statistics provider
pub trait MemoryInfo {
    /// Get overall memory statistics
    fn stats(&self) -> MemoryStats;

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}

impl Allocator for super::MemoryManager {
    fn allocate(&mut self, processes: &mut ProcessTable, pid: Pid) -> MemoryResult<Admission> {
        super::MemoryManager::allocate(self, processes, pid)
    }

    fn deallocate(&mut self, processes: &mut ProcessTable, pid: Pid) -> bool {
        super::MemoryManager::deallocate(self, processes, pid)
    }
}
