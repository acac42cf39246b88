/*!
 * Tick-Driven Scheduler
 *
 * Advances simulated time one tick at a time over a fixed array of CPUs and
 * a strict FIFO ready queue.
 *
 * Each tick runs two phases, CPUs visited in ascending index order:
 *
 * 1. **Dispatch**: every empty CPU takes the front of the ready queue. A
 *    process that lost its memory residency is re-admitted first; if that
 *    fails it goes to the back of the queue and the next one is tried.
 * 2. **Execute**: every occupied CPU advances its process by one tick.
 *    Finished processes release their memory and CPU; under round-robin a
 *    process whose quantum ran out goes to the back of the queue.
 *
 * A process therefore runs at most once per tick, and one requeued in tick N
 * is dispatched in tick N+1 at the earliest.
 */

use super::cpu::Cpu;
use super::types::{
    CpuSnapshot, SchedulerError, SchedulerPolicy, SchedulerResult, SchedulerStats, TickReport,
};
use crate::config::SimConfig;
use crate::core::types::{CpuId, Pid};
use crate::memory::Allocator;
use crate::process::ProcessTable;
use std::collections::VecDeque;
use tracing::{debug, info, trace, warn};

/// CPU scheduler
#[derive(Debug)]
pub struct Scheduler {
    cpus: Vec<Cpu>,
    ready_queue: VecDeque<Pid>,
    policy: SchedulerPolicy,
    quantum: u32,
    ticks_per_instruction: u32,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a scheduler with `num_cpus` idle cores.
    ///
    /// `delay_per_exec` is the number of ticks one instruction takes; 0 is
    /// treated as 1.
    pub fn new(num_cpus: usize, policy: SchedulerPolicy, quantum: u32, delay_per_exec: u32) -> Self {
        info!(
            num_cpus,
            policy = %policy,
            quantum,
            delay_per_exec,
            "Scheduler initialized"
        );

        Self {
            cpus: (0..num_cpus).map(Cpu::new).collect(),
            ready_queue: VecDeque::new(),
            policy,
            quantum,
            ticks_per_instruction: delay_per_exec.max(1),
            stats: SchedulerStats::default(),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.num_cpu,
            config.scheduler,
            config.quantum,
            config.delay_per_exec,
        )
    }

    /// Append a process to the back of the ready queue
    pub fn add_process(&mut self, processes: &ProcessTable, pid: Pid) -> SchedulerResult<()> {
        let process = processes
            .get(pid)
            .ok_or(SchedulerError::ProcessNotFound(pid))?;

        if process.is_finished() {
            return Err(SchedulerError::ProcessFinished(pid));
        }
        if self.is_queued(pid) || self.running_on(pid).is_some() {
            return Err(SchedulerError::AlreadyScheduled(pid));
        }

        self.ready_queue.push_back(pid);
        trace!(pid = %pid, queue_len = self.ready_queue.len(), "Process enqueued");
        Ok(())
    }

    /// Advance simulated time by one tick
    pub fn tick<M: Allocator>(&mut self, processes: &mut ProcessTable, memory: &mut M) -> TickReport {
        self.stats.total_ticks += 1;
        let mut report = TickReport {
            tick: self.stats.total_ticks,
            ..TickReport::default()
        };

        // Dispatch phase
        for index in 0..self.cpus.len() {
            if !self.cpus[index].is_idle() {
                continue;
            }
            if let Some(pid) = self.dispatch_next(processes, memory) {
                let quantum = self.dispatch_quantum();
                self.cpus[index].assign(pid, quantum);
                self.stats.dispatches += 1;
                report.dispatched.push((index, pid));
                trace!(cpu = index, pid = %pid, quantum, "Process dispatched");
            }
        }

        // Execute phase
        let ticks_per_instruction = self.ticks_per_instruction;
        for cpu in self.cpus.iter_mut() {
            let Some(pid) = cpu.running else {
                cpu.active = false;
                self.stats.idle_ticks += 1;
                report.idle_cpus += 1;
                continue;
            };

            let Some(process) = processes.get_mut(pid) else {
                warn!(cpu = cpu.id, pid = %pid, "Running process vanished from table");
                cpu.release();
                cpu.active = false;
                self.stats.idle_ticks += 1;
                report.idle_cpus += 1;
                continue;
            };

            let finished = process.execute_tick(ticks_per_instruction);
            cpu.active = true;
            cpu.active_ticks += 1;
            self.stats.active_ticks += 1;

            if finished {
                cpu.release();
                memory.deallocate(processes, pid);
                self.stats.completions += 1;
                report.completed.push(pid);
                debug!(cpu = cpu.id, pid = %pid, tick = report.tick, "Process finished");
            } else if self.policy == SchedulerPolicy::RoundRobin {
                cpu.quantum_left = cpu.quantum_left.saturating_sub(1);
                if cpu.quantum_left == 0 {
                    cpu.release();
                    self.ready_queue.push_back(pid);
                    self.stats.preemptions += 1;
                    report.preempted.push(pid);
                    trace!(cpu = cpu.id, pid = %pid, "Quantum expired, process requeued");
                }
            }
        }

        report
    }

    /// Pop the first dispatchable process, re-admitting it if it was swapped out.
    ///
    /// Each queued process is considered at most once per call.
    fn dispatch_next<M: Allocator>(&mut self, processes: &mut ProcessTable, memory: &mut M) -> Option<Pid> {
        let mut attempts = self.ready_queue.len();

        while attempts > 0 {
            attempts -= 1;
            let pid = self.ready_queue.pop_front()?;

            match processes.get(pid) {
                None => {
                    warn!(pid = %pid, "Dropping unknown process from ready queue");
                    continue;
                }
                Some(process) if process.is_finished() => {
                    warn!(pid = %pid, "Dropping finished process from ready queue");
                    continue;
                }
                Some(process) if process.in_memory() => return Some(pid),
                Some(_) => {}
            }

            match memory.allocate(processes, pid) {
                Ok(admission) => {
                    debug!(
                        pid = %pid,
                        evicted = admission.evicted.len(),
                        "Process re-admitted at dispatch"
                    );
                    return Some(pid);
                }
                Err(e) => {
                    debug!(pid = %pid, error = %e, "Admission failed, deferring dispatch");
                    self.stats.deferred_admissions += 1;
                    self.ready_queue.push_back(pid);
                }
            }
        }

        None
    }

    fn dispatch_quantum(&self) -> u32 {
        match self.policy {
            SchedulerPolicy::RoundRobin => self.quantum,
            SchedulerPolicy::Fcfs => 0,
        }
    }

    /// Release every CPU and empty the ready queue.
    ///
    /// Released processes are not finished; their memory is returned so the
    /// pool does not fill with work nobody will run. Returns the released
    /// pids, CPUs first (index order) then queue order.
    pub fn stop<M: Allocator>(&mut self, processes: &mut ProcessTable, memory: &mut M) -> Vec<Pid> {
        let mut released: Vec<Pid> = Vec::new();
        for cpu in self.cpus.iter_mut() {
            if let Some(pid) = cpu.release() {
                released.push(pid);
            }
            cpu.active = false;
        }
        released.extend(self.ready_queue.drain(..));

        for &pid in &released {
            memory.deallocate(processes, pid);
        }

        info!(released = released.len(), "Scheduler stopped");
        released
    }

    pub fn policy(&self) -> SchedulerPolicy {
        self.policy
    }

    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    pub fn ticks_per_instruction(&self) -> u32 {
        self.ticks_per_instruction
    }

    pub fn cpu_count(&self) -> usize {
        self.cpus.len()
    }

    /// CPUs currently holding a process
    pub fn active_cpus(&self) -> usize {
        self.cpus.iter().filter(|cpu| !cpu.is_idle()).count()
    }

    /// Share of CPUs currently holding a process, in percent
    pub fn utilization(&self) -> f64 {
        if self.cpus.is_empty() {
            return 0.0;
        }
        self.active_cpus() as f64 / self.cpus.len() as f64 * 100.0
    }

    pub fn cpus(&self) -> Vec<CpuSnapshot> {
        self.cpus.iter().map(Cpu::snapshot).collect()
    }

    /// Ready queue contents, front first
    pub fn ready_queue(&self) -> Vec<Pid> {
        self.ready_queue.iter().copied().collect()
    }

    pub fn queue_len(&self) -> usize {
        self.ready_queue.len()
    }

    pub fn is_queued(&self, pid: Pid) -> bool {
        self.ready_queue.contains(&pid)
    }

    pub fn running_on(&self, pid: Pid) -> Option<CpuId> {
        self.cpus
            .iter()
            .find(|cpu| cpu.running == Some(pid))
            .map(|cpu| cpu.id)
    }

    /// No process queued or running
    pub fn is_empty(&self) -> bool {
        self.ready_queue.is_empty() && self.cpus.iter().all(Cpu::is_idle)
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryManager;
    use crate::process::Process;

    fn setup(instructions: &[u64]) -> (ProcessTable, MemoryManager) {
        let mut table = ProcessTable::new();
        for (i, &count) in instructions.iter().enumerate() {
            let pid = Pid(i as u32 + 1);
            table
                .insert(Process::new(pid, format!("p{}", pid), count, 64, 64))
                .unwrap();
        }
        (table, MemoryManager::new(1024, 64).unwrap())
    }

    #[test]
    fn test_fcfs_single_cpu_scenario() {
        let (mut table, mut mem) = setup(&[3, 2]);
        let mut scheduler = Scheduler::new(1, SchedulerPolicy::Fcfs, 0, 1);
        scheduler.add_process(&table, Pid(1)).unwrap();
        scheduler.add_process(&table, Pid(2)).unwrap();

        let mut finished_at = Vec::new();
        for _ in 0..5 {
            let report = scheduler.tick(&mut table, &mut mem);
            for pid in report.completed {
                finished_at.push((pid, report.tick));
            }
        }

        assert_eq!(finished_at, vec![(Pid(1), 3), (Pid(2), 5)]);
        assert_eq!(scheduler.stats().idle_ticks, 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_round_robin_single_process_scenario() {
        let (mut table, mut mem) = setup(&[5]);
        let mut scheduler = Scheduler::new(1, SchedulerPolicy::RoundRobin, 2, 1);
        scheduler.add_process(&table, Pid(1)).unwrap();

        let first = scheduler.tick(&mut table, &mut mem);
        assert_eq!(first.dispatched, vec![(0, Pid(1))]);
        assert_eq!(scheduler.cpus()[0].quantum_left, 1);

        let second = scheduler.tick(&mut table, &mut mem);
        assert_eq!(second.preempted, vec![Pid(1)]);
        assert_eq!(table.get(Pid(1)).unwrap().remaining_instructions(), 3);

        scheduler.tick(&mut table, &mut mem);
        scheduler.tick(&mut table, &mut mem);
        assert_eq!(table.get(Pid(1)).unwrap().remaining_instructions(), 1);

        let fifth = scheduler.tick(&mut table, &mut mem);
        assert_eq!(fifth.completed, vec![Pid(1)]);
        assert_eq!(scheduler.stats().preemptions, 2);
        assert_eq!(scheduler.stats().idle_ticks, 0);
    }

    #[test]
    fn test_add_process_rejects_duplicates_and_finished() {
        let (mut table, mut mem) = setup(&[1]);
        let mut scheduler = Scheduler::new(1, SchedulerPolicy::Fcfs, 0, 1);

        scheduler.add_process(&table, Pid(1)).unwrap();
        assert_eq!(
            scheduler.add_process(&table, Pid(1)),
            Err(SchedulerError::AlreadyScheduled(Pid(1)))
        );

        scheduler.tick(&mut table, &mut mem);
        assert_eq!(
            scheduler.add_process(&table, Pid(1)),
            Err(SchedulerError::ProcessFinished(Pid(1)))
        );
        assert_eq!(
            scheduler.add_process(&table, Pid(7)),
            Err(SchedulerError::ProcessNotFound(Pid(7)))
        );
    }

    #[test]
    fn test_dispatch_admits_non_resident_process() {
        let (mut table, mut mem) = setup(&[2]);
        let mut scheduler = Scheduler::new(1, SchedulerPolicy::Fcfs, 0, 1);
        scheduler.add_process(&table, Pid(1)).unwrap();

        scheduler.tick(&mut table, &mut mem);
        assert!(table.get(Pid(1)).unwrap().in_memory());
        assert_eq!(mem.used_kb(), 64);

        scheduler.tick(&mut table, &mut mem);
        assert!(!table.get(Pid(1)).unwrap().in_memory());
        assert_eq!(mem.used_kb(), 0);
    }

    #[test]
    fn test_delay_slows_execution() {
        let (mut table, mut mem) = setup(&[2]);
        let mut scheduler = Scheduler::new(1, SchedulerPolicy::Fcfs, 0, 3);
        scheduler.add_process(&table, Pid(1)).unwrap();

        let mut ticks = 0;
        while !table.get(Pid(1)).unwrap().is_finished() {
            scheduler.tick(&mut table, &mut mem);
            ticks += 1;
        }
        assert_eq!(ticks, 6);
    }

    #[test]
    fn test_idle_ticks_counted_per_cpu() {
        let (mut table, mut mem) = setup(&[1]);
        let mut scheduler = Scheduler::new(2, SchedulerPolicy::Fcfs, 0, 1);
        scheduler.add_process(&table, Pid(1)).unwrap();

        let report = scheduler.tick(&mut table, &mut mem);
        assert_eq!(report.idle_cpus, 1);
        scheduler.tick(&mut table, &mut mem);
        assert_eq!(scheduler.stats().idle_ticks, 3);
        assert_eq!(scheduler.stats().active_ticks, 1);
    }

    #[test]
    fn test_stop_releases_cpus_queue_and_memory() {
        let (mut table, mut mem) = setup(&[10, 10, 10]);
        let mut scheduler = Scheduler::new(2, SchedulerPolicy::RoundRobin, 4, 1);
        for raw in 1..=3 {
            scheduler.add_process(&table, Pid(raw)).unwrap();
        }
        scheduler.tick(&mut table, &mut mem);
        assert_eq!(scheduler.active_cpus(), 2);

        let released = scheduler.stop(&mut table, &mut mem);
        assert_eq!(released, vec![Pid(1), Pid(2), Pid(3)]);
        assert!(scheduler.is_empty());
        assert_eq!(mem.used_kb(), 0);
        assert!(!table.get(Pid(1)).unwrap().is_finished());
    }
}
