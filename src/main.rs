/*!
 * Scheduler Simulator - Main Entry Point
 *
 * Interactive shell over a simulated multi-core scheduler:
 * - FCFS and round-robin dispatch
 * - Flat or paged memory with oldest-first eviction
 * - Periodic batch process generation
 */

use sched_sim_kernel::core::limits::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use sched_sim_kernel::{init_tracing, Shell};
use std::path::PathBuf;
use tracing::info;

/// Configuration path: first argument, then `SIM_CONFIG`, then `config.txt`
fn config_path() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    init_tracing("warn");

    let config_path = config_path();
    info!(config = %config_path.display(), "Scheduler simulator starting");

    Shell::new(config_path).run().await?;

    info!("Scheduler simulator exited");
    Ok(())
}
