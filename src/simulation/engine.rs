/*!
 * Simulation
 *
 * Aggregate owning the process table, factory, memory manager and scheduler.
 * Every logical operation is a single `&mut self` call, so an operation
 * always observes and leaves a consistent state.
 */

use super::snapshot::SimulationSnapshot;
use crate::config::{ConfigResult, SimConfig};
use crate::core::types::{KernelResult, Pid, Tick};
use crate::memory::{MemoryInfo, MemoryManager};
use crate::process::{
    Process, ProcessError, ProcessFactory, ProcessInfo, ProcessResult, ProcessState, ProcessTable,
};
use crate::scheduler::{Scheduler, TickReport};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    factory: ProcessFactory,
    processes: ProcessTable,
    memory: MemoryManager,
    scheduler: Scheduler,
    running: bool,
}

impl Simulation {
    /// Build a simulation from a configuration, validating it first
    pub fn new(config: SimConfig) -> ConfigResult<Self> {
        config.validate()?;
        let factory = ProcessFactory::new(&config);
        Self::build(config, factory)
    }

    /// Same as [`Simulation::new`] with a deterministic process factory
    pub fn with_seed(config: SimConfig, seed: u64) -> ConfigResult<Self> {
        config.validate()?;
        let factory = ProcessFactory::with_seed(&config, seed);
        Self::build(config, factory)
    }

    fn build(config: SimConfig, factory: ProcessFactory) -> ConfigResult<Self> {
        let memory = MemoryManager::from_config(&config)?;
        let scheduler = Scheduler::from_config(&config);

        info!(
            num_cpu = config.num_cpu,
            scheduler = %config.scheduler,
            memory_mode = %memory.mode(),
            "Simulation initialized"
        );

        Ok(Self {
            config,
            factory,
            processes: ProcessTable::new(),
            memory,
            scheduler,
            running: false,
        })
    }

    /// Create a named process, try to admit it and put it in the ready queue.
    ///
    /// A failed admission is not an error here: the process stays queued
    /// outside memory and is admitted again when it reaches a CPU.
    pub fn create_process(&mut self, name: &str) -> KernelResult<ProcessInfo> {
        if self.processes.contains_name(name) {
            return Err(ProcessError::DuplicateName(name.to_string()).into());
        }

        let process = self.factory.create(name)?;
        let pid = self.processes.insert(process)?;

        if let Err(e) = self.memory.allocate(&mut self.processes, pid) {
            warn!(pid = %pid, name, error = %e, "Admission failed, deferring to dispatch");
        }
        self.scheduler.add_process(&self.processes, pid)?;

        let info = self.info(pid)?;
        info!(
            pid = %pid,
            name,
            instructions = info.total_instructions,
            memory_kb = info.memory_required_kb,
            in_memory = info.in_memory,
            "Process created"
        );
        Ok(info)
    }

    /// Generate one batch process.
    ///
    /// Returns `None` when the process could not be admitted; it is dropped
    /// rather than retried.
    pub fn spawn_batch(&mut self) -> Option<ProcessInfo> {
        let process = self.factory.create_batch();
        let name = process.name().to_string();

        let pid = match self.processes.insert(process) {
            Ok(pid) => pid,
            Err(e) => {
                warn!(name = %name, error = %e, "Skipping batch process");
                return None;
            }
        };

        if let Err(e) = self.memory.allocate(&mut self.processes, pid) {
            warn!(pid = %pid, name = %name, error = %e, "Memory full, dropping batch process");
            self.processes.remove(pid);
            return None;
        }

        if let Err(e) = self.scheduler.add_process(&self.processes, pid) {
            warn!(pid = %pid, error = %e, "Batch process not scheduled");
            self.memory.deallocate(&mut self.processes, pid);
            self.processes.remove(pid);
            return None;
        }

        debug!(pid = %pid, name = %name, "Batch process generated");
        self.info(pid).ok()
    }

    /// Enable ticking and re-queue processes a previous stop released.
    ///
    /// Returns false if the simulation was already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;

        let mut idle: Vec<Pid> = self
            .processes
            .iter()
            .filter(|p| !p.is_finished())
            .map(Process::pid)
            .filter(|&pid| !self.scheduler.is_queued(pid) && self.scheduler.running_on(pid).is_none())
            .collect();
        idle.sort_unstable();

        for pid in &idle {
            if let Err(e) = self.scheduler.add_process(&self.processes, *pid) {
                warn!(pid = %pid, error = %e, "Could not resume process");
            }
        }

        info!(resumed = idle.len(), "Simulation started");
        true
    }

    /// Advance the scheduler by one tick
    pub fn tick(&mut self) -> TickReport {
        self.scheduler.tick(&mut self.processes, &mut self.memory)
    }

    /// Tick until nothing is queued or running, at most `limit` times.
    ///
    /// Returns the number of ticks taken.
    pub fn run_until_idle(&mut self, limit: Tick) -> Tick {
        let mut ticks = 0;
        while ticks < limit && !self.scheduler.is_empty() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    /// Disable ticking and release every CPU and queued process
    pub fn stop(&mut self) -> Vec<Pid> {
        self.running = false;
        let released = self.scheduler.stop(&mut self.processes, &mut self.memory);
        info!(released = released.len(), "Simulation stopped");
        released
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Look up an unfinished process by name
    pub fn process(&self, name: &str) -> ProcessResult<ProcessInfo> {
        let process = self.processes.lookup_active(name)?;
        Ok(ProcessInfo::from_process(process, self.state_of(process.pid())))
    }

    pub fn info(&self, pid: Pid) -> ProcessResult<ProcessInfo> {
        let process = self
            .processes
            .get(pid)
            .ok_or(ProcessError::PidNotFound(pid))?;
        Ok(ProcessInfo::from_process(process, self.state_of(pid)))
    }

    pub fn state_of(&self, pid: Pid) -> ProcessState {
        if self.processes.get(pid).is_some_and(Process::is_finished) {
            ProcessState::Finished
        } else if let Some(cpu) = self.scheduler.running_on(pid) {
            ProcessState::Running(cpu)
        } else if self.scheduler.is_queued(pid) {
            ProcessState::Ready
        } else {
            ProcessState::Idle
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        let mut processes: Vec<ProcessInfo> = self
            .processes
            .iter()
            .map(|p| ProcessInfo::from_process(p, self.state_of(p.pid())))
            .collect();
        processes.sort_by_key(|p| p.pid);

        SimulationSnapshot {
            tick: self.scheduler.stats().total_ticks,
            taken_at: OffsetDateTime::now_utc(),
            running: self.running,
            config: self.config.clone(),
            cpus: self.scheduler.cpus(),
            ready_queue: self.scheduler.ready_queue(),
            scheduler: self.scheduler.stats().clone(),
            memory: self.memory.stats(),
            processes,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }
}
