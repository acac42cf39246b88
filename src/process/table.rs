/*!
 * Process Table
 * Owns every process created during a simulation, indexed by pid and name
 */

use super::types::{Process, ProcessError, ProcessResult};
use crate::core::types::Pid;
use ahash::AHashMap;

/// Process table
///
/// Iteration order is unspecified; callers that render lists sort by pid.
#[derive(Debug, Default)]
pub struct ProcessTable {
    processes: AHashMap<Pid, Process>,
    names: AHashMap<String, Pid>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new process; names stay unique for the table's lifetime
    pub fn insert(&mut self, process: Process) -> ProcessResult<Pid> {
        if self.names.contains_key(process.name()) {
            return Err(ProcessError::DuplicateName(process.name().to_string()));
        }
        let pid = process.pid();
        self.names.insert(process.name().to_string(), pid);
        self.processes.insert(pid, process);
        Ok(pid)
    }

    /// Drop a process that never made it into the simulation
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        let process = self.processes.remove(&pid)?;
        self.names.remove(process.name());
        Some(process)
    }

    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Process> {
        self.names.get(name).and_then(|pid| self.processes.get(pid))
    }

    /// Lookup for user-facing commands: finished processes count as gone
    pub fn lookup_active(&self, name: &str) -> ProcessResult<&Process> {
        match self.find_by_name(name) {
            Some(process) if !process.is_finished() => Ok(process),
            _ => Err(ProcessError::NotFound(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
