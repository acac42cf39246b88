/*!
 * ID Generation
 * Monotonic process identifier allocation
 */

use super::types::Pid;
use std::sync::atomic::{AtomicU32, Ordering};

/// Generic ID generator interface
pub trait IdGenerator<T> {
    /// Generate next ID
    fn next(&self) -> T;

    /// Peek at the ID the next call will hand out
    fn current(&self) -> T;
}

/// Atomic counter for process IDs
///
/// Owned by whoever creates processes, so separate simulations (and tests
/// running in parallel) never share a counter. IDs are never recycled.
#[derive(Debug)]
pub struct PidGenerator {
    counter: AtomicU32,
}

impl PidGenerator {
    /// Create new generator starting at given value
    #[inline]
    pub fn new(start: u32) -> Self {
        Self {
            counter: AtomicU32::new(start),
        }
    }
}

impl Default for PidGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdGenerator<Pid> for PidGenerator {
    #[inline]
    fn next(&self) -> Pid {
        Pid(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    #[inline]
    fn current(&self) -> Pid {
        Pid(self.counter.load(Ordering::Relaxed))
    }
}
