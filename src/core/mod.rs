/*!
 * Core Module
 * Fundamental simulator types, identifiers, limits and error handling
 */

pub mod errors;
pub mod id;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use id::{IdGenerator, PidGenerator};
pub use types::*;
