/*!
 * Simulation Task
 *
 * Single tokio task owning the `Simulation`. The tick timer, the batch
 * generation timer and the command channel are multiplexed with
 * `tokio::select!`, so every operation runs to completion before the next
 * one starts and no locking is needed.
 */

use super::engine::Simulation;
use super::snapshot::SimulationSnapshot;
use crate::core::limits::DEFAULT_TICK_INTERVAL;
use crate::core::{KernelError, KernelResult, Pid};
use crate::process::{ProcessInfo, ProcessResult};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

/// Wall-clock pacing of the driver timers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTiming {
    pub tick_interval: Duration,
    pub batch_interval: Duration,
}

impl SimulationTiming {
    pub fn from_simulation(simulation: &Simulation) -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            batch_interval: simulation.config().batch_interval(),
        }
    }
}

/// Control messages for the simulation task
#[derive(Debug)]
pub enum SimulationCommand {
    /// Create, admit and enqueue a named process
    CreateProcess {
        name: String,
        reply: oneshot::Sender<KernelResult<ProcessInfo>>,
    },
    /// Start ticking and batch generation
    Start { reply: oneshot::Sender<bool> },
    /// Stop ticking and release all CPUs and queued processes
    Stop { reply: oneshot::Sender<Vec<Pid>> },
    Snapshot {
        reply: oneshot::Sender<SimulationSnapshot>,
    },
    /// Look up an unfinished process by name
    Process {
        name: String,
        reply: oneshot::Sender<ProcessResult<ProcessInfo>>,
    },
    /// Shutdown the simulation task
    Shutdown,
}

/// Handle to the simulation background task
pub struct SimulationTask {
    command_tx: mpsc::UnboundedSender<SimulationCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl SimulationTask {
    /// Spawn the task with the configured pacing
    pub fn spawn(simulation: Simulation) -> Self {
        let timing = SimulationTiming::from_simulation(&simulation);
        Self::spawn_with_timing(simulation, timing)
    }

    pub fn spawn_with_timing(simulation: Simulation, timing: SimulationTiming) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            run_simulation_loop(simulation, timing, command_rx).await;
        });

        info!(
            tick_interval_ms = timing.tick_interval.as_millis() as u64,
            batch_interval_ms = timing.batch_interval.as_millis() as u64,
            "Simulation task spawned"
        );

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    pub async fn create_process(&self, name: &str) -> KernelResult<ProcessInfo> {
        let name = name.to_string();
        self.request(|reply| SimulationCommand::CreateProcess { name, reply })
            .await?
    }

    /// Returns false if the simulation was already running
    pub async fn start(&self) -> KernelResult<bool> {
        self.request(|reply| SimulationCommand::Start { reply }).await
    }

    pub async fn stop(&self) -> KernelResult<Vec<Pid>> {
        self.request(|reply| SimulationCommand::Stop { reply }).await
    }

    pub async fn snapshot(&self) -> KernelResult<SimulationSnapshot> {
        self.request(|reply| SimulationCommand::Snapshot { reply })
            .await
    }

    pub async fn process(&self, name: &str) -> KernelResult<ProcessInfo> {
        let name = name.to_string();
        let result = self
            .request(|reply| SimulationCommand::Process { name, reply })
            .await?;
        Ok(result?)
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> SimulationCommand,
    ) -> KernelResult<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(command(reply_tx))
            .map_err(|_| KernelError::TaskUnavailable("command channel closed".into()))?;
        reply_rx
            .await
            .map_err(|_| KernelError::TaskUnavailable("task dropped the reply".into()))
    }

    /// Shutdown the simulation task gracefully
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(SimulationCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Simulation task shutdown error");
            } else {
                info!("Simulation task shutdown complete");
            }
        }
    }
}

fn paced_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_simulation_loop(
    mut simulation: Simulation,
    timing: SimulationTiming,
    mut command_rx: mpsc::UnboundedReceiver<SimulationCommand>,
) {
    let mut tick_timer = paced_interval(timing.tick_interval);
    let mut batch_timer = paced_interval(timing.batch_interval);

    loop {
        let running = simulation.is_running();

        tokio::select! {
            _ = tick_timer.tick(), if running => {
                let report = simulation.tick();
                if !report.completed.is_empty() || !report.preempted.is_empty() {
                    trace!(
                        tick = report.tick,
                        completed = report.completed.len(),
                        preempted = report.preempted.len(),
                        "Tick"
                    );
                }
            }

            _ = batch_timer.tick(), if running => {
                simulation.spawn_batch();
            }

            command = command_rx.recv() => {
                let Some(command) = command else {
                    debug!("All simulation handles dropped");
                    break;
                };

                match command {
                    SimulationCommand::CreateProcess { name, reply } => {
                        let _ = reply.send(simulation.create_process(&name));
                    }

                    SimulationCommand::Start { reply } => {
                        let started = simulation.start();
                        if started {
                            tick_timer.reset();
                            batch_timer.reset();
                        }
                        let _ = reply.send(started);
                    }

                    SimulationCommand::Stop { reply } => {
                        let _ = reply.send(simulation.stop());
                    }

                    SimulationCommand::Snapshot { reply } => {
                        let _ = reply.send(simulation.snapshot());
                    }

                    SimulationCommand::Process { name, reply } => {
                        let _ = reply.send(simulation.process(&name));
                    }

                    SimulationCommand::Shutdown => {
                        info!("Simulation task shutting down");
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for SimulationTask {
    fn drop(&mut self) {
        // Attempt graceful shutdown if handle still exists
        if self.handle.is_some() {
            let _ = self.command_tx.send(SimulationCommand::Shutdown);
        }
    }
}
