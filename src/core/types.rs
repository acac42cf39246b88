/*!
 * Core Types
 * Common types used across the simulator
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Process identifier (monotonic, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(raw: u32) -> Self {
        Pid(raw)
    }
}

/// Memory quantities are tracked in kilobytes
pub type Kilobytes = u64;

/// Simulated time unit
pub type Tick = u64;

/// CPU slot index within the fixed core array
pub type CpuId = usize;

/// Common result type for simulator operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;

/// Ceiling division used for footprint-to-frame conversion.
///
/// Returns 0 when `frame_size_kb` is 0 so callers never divide by zero.
#[inline]
pub const fn pages_for(memory_kb: Kilobytes, frame_size_kb: Kilobytes) -> u64 {
    if frame_size_kb == 0 {
        0
    } else {
        memory_kb.div_ceil(frame_size_kb)
    }
}
