/*!
 * Memory Manager
 *
 * Admits processes into a bounded pool and evicts under pressure.
 *
 * ## Modes
 *
 * - **Flat**: one frame spans the whole pool; admission only checks a KB
 *   counter.
 * - **Paging**: the pool is split into `total / frame_size` frames; a process
 *   needs `ceil(required / frame_size)` of them, reserved lowest index first.
 *
 * ## Eviction
 *
 * When an admission does not fit, the earliest-admitted resident process is
 * swapped out until it does. Swapped-out processes stay in the backing store
 * and keep their place in the scheduler; only residency changes.
 *
 * Paged-in/paged-out counters are kept in both modes and count pages.
 */

use super::backing_store::BackingStore;
use super::frames::FrameTable;
use super::traits::MemoryInfo;
use super::types::{Admission, MemoryError, MemoryMode, MemoryResult, MemoryStats};
use crate::config::{validate_memory_geometry, ConfigResult, SimConfig};
use crate::core::types::{pages_for, Kilobytes, Pid};
use crate::process::ProcessTable;
use tracing::{debug, info};

/// Allocation strategy selected once at construction
#[derive(Debug, Clone)]
enum Allocation {
    Flat,
    Paging(FrameTable),
}

/// Memory manager
#[derive(Debug)]
pub struct MemoryManager {
    total_kb: Kilobytes,
    frame_size_kb: Kilobytes,
    allocation: Allocation,
    used_kb: Kilobytes,
    paged_in: u64,
    paged_out: u64,
    store: BackingStore,
}

impl MemoryManager {
    /// Create a memory manager over `total_kb` split into `frame_size_kb` frames
    pub fn new(total_kb: Kilobytes, frame_size_kb: Kilobytes) -> ConfigResult<Self> {
        validate_memory_geometry(total_kb, frame_size_kb)?;

        let allocation = if frame_size_kb == total_kb {
            Allocation::Flat
        } else {
            Allocation::Paging(FrameTable::new((total_kb / frame_size_kb) as usize))
        };

        let manager = Self {
            total_kb,
            frame_size_kb,
            allocation,
            used_kb: 0,
            paged_in: 0,
            paged_out: 0,
            store: BackingStore::new(),
        };
        info!(
            total_kb,
            frame_size_kb,
            mode = %manager.mode(),
            "Memory manager initialized"
        );
        Ok(manager)
    }

    pub fn from_config(config: &SimConfig) -> ConfigResult<Self> {
        Self::new(config.total_memory_kb, config.frame_size_kb)
    }

    pub fn mode(&self) -> MemoryMode {
        match self.allocation {
            Allocation::Flat => MemoryMode::Flat,
            Allocation::Paging(_) => MemoryMode::Paging,
        }
    }

    /// Admit a process, evicting the oldest residents if needed.
    ///
    /// All-or-nothing: on error no frames stay reserved and the process is
    /// left outside memory. A request larger than the whole pool fails
    /// without evicting anything.
    pub fn allocate(&mut self, processes: &mut ProcessTable, pid: Pid) -> MemoryResult<Admission> {
        let process = processes.get(pid).ok_or(MemoryError::UnknownProcess(pid))?;
        if process.is_finished() {
            return Err(MemoryError::ProcessFinished(pid));
        }

        if self.store.is_resident(pid) {
            return Ok(Admission {
                pid,
                frames: self.reserved_frames(pid).to_vec(),
                evicted: Vec::new(),
                already_resident: true,
            });
        }

        let required_kb = process.memory_required_kb();
        let pages = pages_for(required_kb, self.frame_size_kb);

        if !self.could_ever_fit(required_kb, pages) {
            return Err(self.out_of_memory(pid, required_kb, pages));
        }

        let mut evicted = Vec::new();
        while !self.fits(required_kb, pages) {
            match self.swap_out_oldest(processes) {
                Some(victim) => evicted.push(victim),
                None => return Err(self.out_of_memory(pid, required_kb, pages)),
            }
        }

        let reserved = match &mut self.allocation {
            Allocation::Flat => Some(Vec::new()),
            Allocation::Paging(table) => table.reserve(pages as usize),
        };
        let Some(frames) = reserved else {
            return Err(self.out_of_memory(pid, required_kb, pages));
        };

        self.used_kb += required_kb;
        self.paged_in += pages;
        self.store.admit(pid, required_kb, pages, frames.clone());
        if let Some(process) = processes.get_mut(pid) {
            process.set_in_memory(true);
        }

        debug!(
            pid = %pid,
            required_kb,
            pages,
            evicted = evicted.len(),
            used_kb = self.used_kb,
            "Process admitted"
        );

        Ok(Admission {
            pid,
            frames,
            evicted,
            already_resident: false,
        })
    }

    /// Release everything held for `pid` and stop tracking it.
    ///
    /// Idempotent; returns false when the process was not tracked.
    pub fn deallocate(&mut self, processes: &mut ProcessTable, pid: Pid) -> bool {
        if let Some(process) = processes.get_mut(pid) {
            process.set_in_memory(false);
        }

        let Some(reservation) = self.store.remove(pid) else {
            return false;
        };

        if reservation.is_resident() {
            self.release(reservation.memory_kb, &reservation.frames);
        }
        debug!(pid = %pid, used_kb = self.used_kb, "Process deallocated");
        true
    }

    /// Swap out the earliest-admitted resident process.
    ///
    /// The victim stays tracked and keeps its scheduler state. Returns the
    /// victim, or `None` when nothing is resident.
    pub fn swap_out_oldest(&mut self, processes: &mut ProcessTable) -> Option<Pid> {
        let victim = self.store.oldest_resident()?;
        let reservation = self.store.evict(victim)?;

        self.release(reservation.memory_kb, &reservation.frames);
        self.paged_out += reservation.pages;
        if let Some(process) = processes.get_mut(victim) {
            process.set_in_memory(false);
        }

        debug!(
            pid = %victim,
            pages = reservation.pages,
            used_kb = self.used_kb,
            "Process swapped out"
        );
        Some(victim)
    }

    fn release(&mut self, memory_kb: Kilobytes, frames: &[usize]) {
        self.used_kb = self.used_kb.saturating_sub(memory_kb);
        if let Allocation::Paging(table) = &mut self.allocation {
            table.release(frames);
        }
    }

    fn fits(&self, required_kb: Kilobytes, pages: u64) -> bool {
        match &self.allocation {
            Allocation::Flat => self.used_kb + required_kb <= self.total_kb,
            Allocation::Paging(table) => table.free() as u64 >= pages,
        }
    }

    fn could_ever_fit(&self, required_kb: Kilobytes, pages: u64) -> bool {
        match &self.allocation {
            Allocation::Flat => required_kb <= self.total_kb,
            Allocation::Paging(table) => table.total() as u64 >= pages,
        }
    }

    fn out_of_memory(&self, pid: Pid, required_kb: Kilobytes, pages: u64) -> MemoryError {
        MemoryError::OutOfMemory {
            pid,
            requested_kb: required_kb,
            requested_frames: pages,
            available_kb: self.free_kb(),
            total_kb: self.total_kb,
        }
    }

    pub fn is_resident(&self, pid: Pid) -> bool {
        self.store.is_resident(pid)
    }

    /// Whether the backing store knows `pid` (resident or swapped out)
    pub fn is_tracked(&self, pid: Pid) -> bool {
        self.store.get(pid).is_some()
    }

    /// Frames currently reserved for `pid` (empty in flat mode or when evicted)
    pub fn reserved_frames(&self, pid: Pid) -> &[usize] {
        self.store
            .get(pid)
            .map(|reservation| reservation.frames.as_slice())
            .unwrap_or(&[])
    }

    /// Resident pids in admission order, oldest first
    pub fn residents(&self) -> Vec<Pid> {
        self.store.residents().collect()
    }

    /// Frames currently reserved across all residents
    pub fn reserved_frame_count(&self) -> usize {
        match &self.allocation {
            Allocation::Flat => self.store.resident_count(),
            Allocation::Paging(table) => table.used(),
        }
    }

    pub fn total_kb(&self) -> Kilobytes {
        self.total_kb
    }

    pub fn used_kb(&self) -> Kilobytes {
        self.used_kb
    }

    pub fn free_kb(&self) -> Kilobytes {
        self.total_kb - self.used_kb
    }

    pub fn frame_size_kb(&self) -> Kilobytes {
        self.frame_size_kb
    }

    pub fn paged_in(&self) -> u64 {
        self.paged_in
    }

    pub fn paged_out(&self) -> u64 {
        self.paged_out
    }
}

impl MemoryInfo for MemoryManager {
    fn stats(&self) -> MemoryStats {
        let (total_frames, free_frames) = match &self.allocation {
            Allocation::Flat => (1, usize::from(self.used_kb == 0)),
            Allocation::Paging(table) => (table.total(), table.free()),
        };

        MemoryStats {
            mode: self.mode(),
            total_kb: self.total_kb,
            used_kb: self.used_kb,
            free_kb: self.free_kb(),
            frame_size_kb: self.frame_size_kb,
            total_frames,
            free_frames,
            paged_in: self.paged_in,
            paged_out: self.paged_out,
            resident_processes: self.store.resident_count(),
            tracked_processes: self.store.len(),
            usage_percentage: (self.used_kb as f64 / self.total_kb as f64) * 100.0,
        }
    }
}
