/*!
 * Interactive Shell
 *
 * Line-oriented state machine over the simulation task. `handle_line` takes
 * one input line and returns the text to print, so the shell can be driven
 * from tests as well as from the stdin REPL in `run`.
 */

pub mod commands;
pub mod report;

pub use commands::{Command, ShellError, ShellResult, HELP_TEXT};

use crate::config::SimConfig;
use crate::core::limits::DEFAULT_REPORT_PATH;
use crate::core::{KernelError, KernelResult};
use crate::monitoring::span_operation;
use crate::simulation::{Simulation, SimulationTask, SimulationTiming};
use report::{ProcessSmi, ProcessView, ReportFile, ScreenList, VmStat};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, Instrument};

const BANNER: &str = r"
          __             __              _
   ______/ /_  ___  ____/ /     _____   (_)___ ___
  / ___/ __ \/ _ \/ __  /_____/ ___/  / / __ `__ \
 (__  ) / / /  __/ /_/ /_____(__  )  / / / / / / /
/____/_/ /_/\___/\__,_/     /____/  /_/_/ /_/ /_/
";

/// What the caller should do after a line was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Print the text (may be empty) and keep reading
    Continue(String),
    /// Print the text and leave the shell
    Exit(String),
}

impl Outcome {
    pub fn text(&self) -> &str {
        match self {
            Outcome::Continue(text) | Outcome::Exit(text) => text,
        }
    }
}

/// Shell state
pub struct Shell {
    config_path: PathBuf,
    seed: Option<u64>,
    timing: Option<SimulationTiming>,
    task: Option<SimulationTask>,
    /// Process name while inside `screen -r`
    attached: Option<String>,
}

impl Shell {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            seed: None,
            timing: None,
            task: None,
            attached: None,
        }
    }

    /// Seed the process factory created by `initialize`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Override the driver pacing used by `initialize`
    pub fn with_timing(mut self, timing: SimulationTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.task.is_some()
    }

    pub fn attached(&self) -> Option<&str> {
        self.attached.as_deref()
    }

    pub fn prompt(&self) -> String {
        match &self.attached {
            Some(name) => format!("[{}]> ", name),
            None => "sched-sim> ".to_string(),
        }
    }

    /// Handle one input line; failures are rendered into the returned text
    pub async fn handle_line(&mut self, line: &str) -> Outcome {
        let result = match self.attached.clone() {
            Some(name) => self.handle_attached(&name, line.trim()).await,
            None => self.handle_command(line).await,
        };

        result.unwrap_or_else(|e| {
            debug!(error = %e, line, "Command failed");
            Outcome::Continue(e.to_string())
        })
    }

    async fn handle_command(&mut self, line: &str) -> ShellResult<Outcome> {
        let Some(command) = Command::parse(line)? else {
            return Ok(Outcome::Continue(String::new()));
        };

        let span = span_operation(line.trim());
        let result = self.execute(command).instrument(span.span().clone()).await;
        match &result {
            Ok(_) => span.record_result(true),
            Err(e) => span.record_error(&e.to_string()),
        }
        result
    }

    async fn execute(&mut self, command: Command) -> ShellResult<Outcome> {
        if command.needs_initialization() && self.task.is_none() {
            return Err(ShellError::NotInitialized);
        }

        let text = match command {
            Command::Help => HELP_TEXT.to_string(),
            Command::Exit => {
                self.shutdown().await;
                return Ok(Outcome::Exit("Exiting emulator...".to_string()));
            }
            Command::Initialize => self.initialize()?,
            Command::ScreenCreate(name) => {
                let info = self.task()?.create_process(&name).await?;
                let mut text = format!(
                    "Process {} created with {} instructions and {} KB memory",
                    info.name, info.total_instructions, info.memory_required_kb
                );
                if !info.in_memory {
                    text.push_str(" (waiting for memory)");
                }
                text
            }
            Command::ScreenList => {
                let snapshot = self.task()?.snapshot().await?;
                ScreenList(&snapshot).to_string()
            }
            Command::ScreenAttach(name) => {
                let info = self.task()?.process(&name).await?;
                self.attached = Some(info.name.clone());
                format!(
                    "[Entering {} shell] type 'process-smi' or 'exit'",
                    info.name
                )
            }
            Command::SchedulerTest => {
                if self.task()?.start().await? {
                    "Starting scheduler test...".to_string()
                } else {
                    "Scheduler test already running.".to_string()
                }
            }
            Command::SchedulerStop => {
                let released = self.task()?.stop().await?;
                format!(
                    "Stopped scheduler test. Released {} process(es).",
                    released.len()
                )
            }
            Command::ReportUtil { path, json } => {
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH));
                self.write_report(&path, json).await?;
                format!("Report written to {}", path.display())
            }
            Command::ProcessSmi => {
                let snapshot = self.task()?.snapshot().await?;
                ProcessSmi(&snapshot).to_string()
            }
            Command::Vmstat => {
                let snapshot = self.task()?.snapshot().await?;
                VmStat(&snapshot).to_string()
            }
        };

        Ok(Outcome::Continue(text))
    }

    async fn handle_attached(&mut self, name: &str, line: &str) -> ShellResult<Outcome> {
        match line {
            "" => Ok(Outcome::Continue(String::new())),
            "exit" => {
                self.attached = None;
                Ok(Outcome::Continue(String::new()))
            }
            "process-smi" => {
                let snapshot = self.task()?.snapshot().await?;
                let text = match snapshot.find(name) {
                    Some(info) => ProcessView(info).to_string(),
                    None => format!("Process {} not found", name),
                };
                Ok(Outcome::Continue(text))
            }
            other => Err(ShellError::UnknownCommand(other.to_string())),
        }
    }

    fn initialize(&mut self) -> ShellResult<String> {
        if self.task.is_some() {
            return Err(ShellError::AlreadyInitialized);
        }

        let config = SimConfig::from_file(&self.config_path).map_err(KernelError::from)?;
        let simulation = match self.seed {
            Some(seed) => Simulation::with_seed(config, seed),
            None => Simulation::new(config),
        }
        .map_err(KernelError::from)?;

        let summary = format!(
            "System initialized: {} CPU(s), {} scheduler, {} KB {} memory.",
            simulation.config().num_cpu,
            simulation.config().scheduler,
            simulation.memory().total_kb(),
            simulation.memory().mode()
        );

        let task = match self.timing {
            Some(timing) => SimulationTask::spawn_with_timing(simulation, timing),
            None => SimulationTask::spawn(simulation),
        };
        self.task = Some(task);

        info!(config = %self.config_path.display(), "Shell initialized simulation");
        Ok(summary)
    }

    async fn write_report(&self, path: &Path, json: bool) -> ShellResult<()> {
        let snapshot = self.task()?.snapshot().await?;
        let contents = if json {
            serde_json::to_string_pretty(&snapshot).map_err(KernelError::from)?
        } else {
            ReportFile(&snapshot).to_string()
        };

        tokio::fs::write(path, contents)
            .await
            .map_err(KernelError::from)?;
        info!(path = %path.display(), json, "Report written");
        Ok(())
    }

    fn task(&self) -> ShellResult<&SimulationTask> {
        self.task.as_ref().ok_or(ShellError::NotInitialized)
    }

    /// Stop the simulation task, if any
    pub async fn shutdown(&mut self) {
        self.attached = None;
        if let Some(task) = self.task.take() {
            task.shutdown().await;
        }
    }

    /// Read commands from stdin until `exit` or end of input
    pub async fn run(mut self) -> KernelResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        stdout.write_all(BANNER.as_bytes()).await?;
        stdout.write_all(b"\nWelcome! Type 'help'.\n").await?;

        loop {
            stdout.write_all(self.prompt().as_bytes()).await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let outcome = self.handle_line(&line).await;
            let text = outcome.text();
            if !text.is_empty() {
                stdout.write_all(text.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            if matches!(outcome, Outcome::Exit(_)) {
                break;
            }
        }

        stdout.flush().await?;
        self.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_commands_require_initialization() {
        let mut shell = Shell::new("does-not-exist.txt");
        let outcome = shell.handle_line("vmstat").await;
        assert_eq!(
            outcome,
            Outcome::Continue("Please initialize the system first.".to_string())
        );
        assert!(shell.handle_line("help").await.text().contains("screen -s"));
    }

    #[tokio::test]
    async fn test_initialize_reports_missing_config() {
        let mut shell = Shell::new("does-not-exist.txt");
        let outcome = shell.handle_line("initialize").await;
        assert!(outcome.text().contains("does-not-exist.txt"));
        assert!(!shell.is_initialized());
    }

    #[tokio::test]
    async fn test_exit_without_initialize() {
        let mut shell = Shell::new("config.txt");
        assert_eq!(
            shell.handle_line("exit").await,
            Outcome::Exit("Exiting emulator...".to_string())
        );
    }

    #[tokio::test]
    async fn test_blank_line_is_silent() {
        let mut shell = Shell::new("config.txt");
        assert_eq!(shell.handle_line("   ").await, Outcome::Continue(String::new()));
        assert_eq!(shell.prompt(), "sched-sim> ");
    }
}
