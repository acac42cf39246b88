/*!
 * Shell Commands
 * Parsing of command lines into typed commands
 */

use crate::core::KernelError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Shell operation result
pub type ShellResult<T> = Result<T, ShellError>;

/// User-facing command failures
#[derive(Error, Debug, Diagnostic)]
pub enum ShellError {
    #[error("Unknown command: {0}")]
    #[diagnostic(code(shell::unknown_command), help("Type `help` for the command list."))]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    #[diagnostic(code(shell::usage))]
    Usage(&'static str),

    #[error("Please initialize the system first.")]
    #[diagnostic(code(shell::not_initialized), help("Run `initialize`."))]
    NotInitialized,

    #[error("System already initialized.")]
    #[diagnostic(code(shell::already_initialized))]
    AlreadyInitialized,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kernel(#[from] KernelError),
}

/// A parsed top-level command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Initialize,
    /// `screen -s <name>`
    ScreenCreate(String),
    /// `screen -ls`
    ScreenList,
    /// `screen -r <name>`
    ScreenAttach(String),
    SchedulerTest,
    SchedulerStop,
    /// `report-util [path] [--json]`
    ReportUtil { path: Option<PathBuf>, json: bool },
    ProcessSmi,
    Vmstat,
    Help,
    Exit,
}

impl Command {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> ShellResult<Option<Self>> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, rest)) = args.split_first() else {
            return Ok(None);
        };

        let command = match head {
            "initialize" => Command::Initialize,
            "screen" => Self::parse_screen(rest)?,
            "scheduler-test" => Command::SchedulerTest,
            "scheduler-stop" => Command::SchedulerStop,
            "report-util" => Self::parse_report(rest)?,
            "process-smi" => Command::ProcessSmi,
            "vmstat" => Command::Vmstat,
            "help" => Command::Help,
            "exit" => Command::Exit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }

    fn parse_screen(args: &[&str]) -> ShellResult<Self> {
        match args {
            ["-s", name] => Ok(Command::ScreenCreate(name.to_string())),
            ["-s", ..] => Err(ShellError::Usage("screen -s <process name>")),
            ["-r", name] => Ok(Command::ScreenAttach(name.to_string())),
            ["-r", ..] => Err(ShellError::Usage("screen -r <process name>")),
            ["-ls"] => Ok(Command::ScreenList),
            _ => Err(ShellError::Usage("screen -s <name> | screen -ls | screen -r <name>")),
        }
    }

    fn parse_report(args: &[&str]) -> ShellResult<Self> {
        let mut path = None;
        let mut json = false;

        for &arg in args {
            match arg {
                "--json" => json = true,
                flag if flag.starts_with('-') => {
                    return Err(ShellError::Usage("report-util [path] [--json]"))
                }
                file if path.is_none() => path = Some(PathBuf::from(file)),
                _ => return Err(ShellError::Usage("report-util [path] [--json]")),
            }
        }

        Ok(Command::ReportUtil { path, json })
    }

    /// Commands that work before `initialize`
    pub fn needs_initialization(&self) -> bool {
        !matches!(self, Command::Initialize | Command::Help | Command::Exit)
    }
}

pub const HELP_TEXT: &str = "\
Available Commands:
  initialize                  - Initialize the system from the configuration file
  screen -s <name>            - Create a new process
  screen -ls                  - List CPUs and processes
  screen -r <name>            - Attach to a running process
  scheduler-test              - Start ticking and batch process generation
  scheduler-stop              - Stop the scheduler and release all CPUs
  report-util [path] [--json] - Write a system report
  process-smi                 - Show CPU, memory and process status
  vmstat                      - Display memory statistics
  help                        - Show this help
  exit                        - Exit the simulator";
