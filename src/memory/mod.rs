/*!
 * Memory Module
 * Flat and paged process admission with oldest-first eviction
 */

mod backing_store;
mod frames;
pub mod manager;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use manager::MemoryManager;
pub use traits::{Allocator, MemoryInfo};
pub use types::*;
