/*!
 * Backing Store
 * Registry of admitted processes with a deterministic admission order
 */

use crate::core::types::{Kilobytes, Pid};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// Memory held (or formerly held) by one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reservation {
    pub(crate) memory_kb: Kilobytes,
    pub(crate) pages: u64,
    pub(crate) frames: Vec<usize>,
    /// Admission sequence number while resident, `None` once evicted
    admitted_seq: Option<u64>,
}

impl Reservation {
    pub(crate) fn is_resident(&self) -> bool {
        self.admitted_seq.is_some()
    }
}

/// Backing store
///
/// Lookups go through a hash map; eviction order comes from a `BTreeMap`
/// keyed by admission sequence, so the oldest resident is always the first
/// key regardless of hashing.
#[derive(Debug, Default)]
pub(crate) struct BackingStore {
    entries: AHashMap<Pid, Reservation>,
    resident_order: BTreeMap<u64, Pid>,
    next_seq: u64,
}

impl BackingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record `pid` as resident and youngest in admission order
    pub(crate) fn admit(&mut self, pid: Pid, memory_kb: Kilobytes, pages: u64, frames: Vec<usize>) {
        if let Some(seq) = self.entries.get(&pid).and_then(|r| r.admitted_seq) {
            self.resident_order.remove(&seq);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.resident_order.insert(seq, pid);
        self.entries.insert(
            pid,
            Reservation {
                memory_kb,
                pages,
                frames,
                admitted_seq: Some(seq),
            },
        );
    }

    pub(crate) fn oldest_resident(&self) -> Option<Pid> {
        self.resident_order.values().next().copied()
    }

    /// Drop residency but keep tracking the process.
    ///
    /// Returns the released reservation (frames included) when `pid` was
    /// resident.
    pub(crate) fn evict(&mut self, pid: Pid) -> Option<Reservation> {
        let entry = self.entries.get_mut(&pid)?;
        let seq = entry.admitted_seq.take()?;
        self.resident_order.remove(&seq);

        let released = Reservation {
            memory_kb: entry.memory_kb,
            pages: entry.pages,
            frames: std::mem::take(&mut entry.frames),
            admitted_seq: None,
        };
        Some(released)
    }

    /// Forget the process entirely
    pub(crate) fn remove(&mut self, pid: Pid) -> Option<Reservation> {
        let entry = self.entries.remove(&pid)?;
        if let Some(seq) = entry.admitted_seq {
            self.resident_order.remove(&seq);
        }
        Some(entry)
    }

    pub(crate) fn get(&self, pid: Pid) -> Option<&Reservation> {
        self.entries.get(&pid)
    }

    pub(crate) fn is_resident(&self, pid: Pid) -> bool {
        self.entries.get(&pid).is_some_and(Reservation::is_resident)
    }

    /// Resident pids, oldest admission first
    pub(crate) fn residents(&self) -> impl Iterator<Item = Pid> + '_ {
        self.resident_order.values().copied()
    }

    pub(crate) fn resident_count(&self) -> usize {
        self.resident_order.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oldest_follows_admission_order() {
        let mut store = BackingStore::new();
        for raw in [30, 10, 20] {
            store.admit(Pid(raw), 64, 1, vec![]);
        }
        assert_eq!(store.oldest_resident(), Some(Pid(30)));
        assert_eq!(store.residents().collect::<Vec<_>>(), vec![Pid(30), Pid(10), Pid(20)]);
    }

    #[test]
    fn test_evict_keeps_tracking() {
        let mut store = BackingStore::new();
        store.admit(Pid(1), 64, 2, vec![0, 1]);
        store.admit(Pid(2), 64, 1, vec![2]);

        let released = store.evict(Pid(1)).unwrap();
        assert_eq!(released.frames, vec![0, 1]);
        assert!(!store.is_resident(Pid(1)));
        assert!(store.get(Pid(1)).is_some());
        assert_eq!(store.oldest_resident(), Some(Pid(2)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.resident_count(), 1);

        // Evicting twice releases nothing
        assert!(store.evict(Pid(1)).is_none());
    }

    #[test]
    fn test_readmission_moves_to_back() {
        let mut store = BackingStore::new();
        store.admit(Pid(1), 64, 1, vec![]);
        store.admit(Pid(2), 64, 1, vec![]);
        store.evict(Pid(1));
        store.admit(Pid(1), 64, 1, vec![]);
        assert_eq!(store.residents().collect::<Vec<_>>(), vec![Pid(2), Pid(1)]);
    }

    #[test]
    fn test_remove_forgets_process() {
        let mut store = BackingStore::new();
        store.admit(Pid(1), 64, 1, vec![]);
        assert!(store.remove(Pid(1)).is_some());
        assert!(store.remove(Pid(1)).is_none());
        assert_eq!(store.oldest_resident(), None);
    }
}
