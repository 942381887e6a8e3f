//! Subprocess execution
//!
//! Every external tool mng drives goes through [`ProcessRunner`]: the
//! generator, the build tool, the compiler and the produced executables.
//! Children inherit stdin/stdout/stderr so their output passes straight
//! through, and each call blocks until the child exits.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// A single external process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name (looked up on PATH) or path to an executable
    pub program: PathBuf,
    /// Arguments, in order
    pub args: Vec<OsString>,
    /// Working directory; `None` inherits mng's own
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Whether the program is a bare name to be resolved on PATH
    pub fn is_bare_program(&self) -> bool {
        self.program.components().count() == 1 && !self.program.is_absolute()
    }

    /// Program name as displayed to the user
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Result of a subprocess execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code(),
            duration,
        }
    }
}

/// Why a process could not be started at all
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("{0} not found on PATH")]
    NotOnPath(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Runs external processes to completion
pub trait ProcessRunner {
    /// Run the command, blocking until it exits
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult, SpawnError>;
}

/// Runs processes on the host with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn resolve(program: &Path) -> Result<PathBuf, SpawnError> {
        which::which(program).map_err(|_| SpawnError::NotOnPath(program.display().to_string()))
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult, SpawnError> {
        let program = if spec.is_bare_program() {
            Self::resolve(&spec.program)?
        } else {
            spec.program.clone()
        };

        let mut cmd = Command::new(&program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        // Inherit stdin/stdout/stderr so tool output shows up as-is
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let start = Instant::now();
        let status = cmd.status()?;
        Ok(CommandResult::from_status(status, start.elapsed()))
    }
}
