/*!
 * System Limits and Constants
 *
 * Centralized location for simulator-wide limits, pacing intervals and
 * default values. Organized by domain.
 */

use std::time::Duration;

// =============================================================================
// CPU LIMITS
// =============================================================================

/// Upper bound on simulated cores
pub const MAX_CPUS: usize = 128;

// =============================================================================
// PACING
// =============================================================================

/// Wall-clock interval between scheduler ticks.
/// Pacing only; simulated time is counted in ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Unit of the BATCH_FREQUENCY configuration value
pub const BATCH_FREQUENCY_UNIT: Duration = Duration::from_secs(1);

// =============================================================================
// FILES
// =============================================================================

/// Configuration file read by `initialize` when nothing else is given
pub const DEFAULT_CONFIG_PATH: &str = "config.txt";

/// Environment variable overriding the configuration path
pub const CONFIG_PATH_ENV: &str = "SIM_CONFIG";

/// Report file written by `report-util` when no path is given
pub const DEFAULT_REPORT_PATH: &str = "sched-sim-report.txt";

// =============================================================================
// MEMORY PRESSURE
// =============================================================================

/// Usage percentage at which memory pressure is reported as high
pub const MEMORY_PRESSURE_HIGH: f64 = 80.0;

/// Usage percentage at which memory pressure is reported as critical
pub const MEMORY_PRESSURE_CRITICAL: f64 = 95.0;
