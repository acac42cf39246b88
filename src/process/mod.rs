/*!
 * Process Module
 * Process lifecycle state, creation and the process table
 */

pub mod factory;
pub mod table;
pub mod types;

pub use factory::ProcessFactory;
pub use table::ProcessTable;
pub use types::{Process, ProcessError, ProcessInfo, ProcessResult, ProcessState};
