/*!
 * Process Factory
 * Random process generation from configured instruction and memory ranges
 */

use super::types::{Process, ProcessError, ProcessResult};
use crate::config::SimConfig;
use crate::core::id::{IdGenerator, PidGenerator};
use crate::core::types::{Kilobytes, Pid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Creates processes with uniformly drawn workloads
///
/// The factory owns the pid counter, so identifiers are unique per
/// simulation and never reused.
#[derive(Debug)]
pub struct ProcessFactory {
    ids: PidGenerator,
    rng: StdRng,
    instructions: RangeInclusive<u64>,
    memory_kb: RangeInclusive<Kilobytes>,
    frame_size_kb: Kilobytes,
}

impl ProcessFactory {
    /// Factory seeded from the OS
    pub fn new(config: &SimConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic factory for tests and reproducible runs
    pub fn with_seed(config: &SimConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &SimConfig, rng: StdRng) -> Self {
        Self {
            ids: PidGenerator::default(),
            rng,
            instructions: config.instruction_range(),
            memory_kb: config.memory_range(),
            frame_size_kb: config.frame_size_kb,
        }
    }

    /// Create a named process
    pub fn create(&mut self, name: &str) -> ProcessResult<Process> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ProcessError::InvalidName(name.to_string()));
        }

        let instructions = self.rng.gen_range(self.instructions.clone());
        let memory_kb = self.rng.gen_range(self.memory_kb.clone());
        let pid = self.ids.next();

        Ok(Process::new(pid, name, instructions, memory_kb, self.frame_size_kb))
    }

    /// Create a batch process named after its pid (`p001`, `p002`, ...)
    pub fn create_batch(&mut self) -> Process {
        let pid = self.ids.next();
        let instructions = self.rng.gen_range(self.instructions.clone());
        let memory_kb = self.rng.gen_range(self.memory_kb.clone());

        Process::new(
            pid,
            format!("p{:03}", pid.0),
            instructions,
            memory_kb,
            self.frame_size_kb,
        )
    }

    /// Pid the next created process will receive
    pub fn next_pid(&self) -> Pid {
        self.ids.current()
    }
}
