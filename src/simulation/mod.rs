/*!
 * Simulation Module
 * Aggregate simulation state and the task that drives it
 */

mod engine;
pub mod snapshot;
pub mod task;

// Re-export for convenience
pub use engine::Simulation;
pub use snapshot::SimulationSnapshot;
pub use task::{SimulationCommand, SimulationTask, SimulationTiming};
