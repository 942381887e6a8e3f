//! Target build orchestration
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator → Target (compiler | tests) → Pipeline → ProcessRunner → cmake/make/cc
//! ```
//!
//! ## Modules
//!
//! - `targets` - The two buildable units: the compiler and its unit tests
//! - `generator` - Generator + build tool invocation (configure, compile)
//! - `pipeline` - Ordered, blocking execution of external steps

pub mod generator;
pub mod pipeline;
pub mod targets;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::config::{FailurePolicy, MngConfig};
use crate::exec::ProcessRunner;
use crate::utils::paths::{build_dir_of, remove_dir_if_present};

pub use pipeline::{Pipeline, StepReport};

/// Build context shared by every target of one invocation
pub struct BuildContext<'a> {
    /// Workspace root (the directory mng was started in)
    pub workspace: PathBuf,
    /// Loaded project configuration
    pub config: MngConfig,
    /// Failure policy after CLI overrides
    pub policy: FailurePolicy,
    /// Spawns the external tools
    pub runner: &'a dyn ProcessRunner,
}

impl<'a> BuildContext<'a> {
    /// Create a new build context
    pub fn new(workspace: PathBuf, config: MngConfig, runner: &'a dyn ProcessRunner) -> Self {
        let policy = config.policy.on_failure;
        Self {
            workspace,
            config,
            policy,
            runner,
        }
    }

    /// Override the configured failure policy
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Which role a target plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Compiler,
    Tests,
}

/// What `clean` found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanOutcome {
    /// The build directory existed and was removed
    Removed { path: PathBuf, bytes: u64 },
    /// There was no build directory
    Absent { path: PathBuf },
}

/// Result of a successful build
#[derive(Debug)]
pub struct BuildReport {
    /// Steps that ran, in order
    pub steps: Vec<StepReport>,
    /// Wall time for the whole build
    pub duration: Duration,
}

impl BuildReport {
    /// Whether every step exited cleanly
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.success)
    }
}

/// What `run` did
#[derive(Debug)]
pub enum RunOutcome {
    /// The artifact was executed
    Completed(StepReport),
    /// A required argument was missing; nothing was spawned
    MissingArgument,
}

/// A buildable unit with its own workspace and build output directory
pub trait Target {
    /// Get the target name
    fn name(&self) -> &str;

    fn kind(&self) -> TargetKind;

    /// Absolute root of the target's workspace
    fn root(&self) -> &Path;

    /// Build output directory, `<root>/build`
    fn build_dir(&self) -> PathBuf {
        build_dir_of(self.root())
    }

    /// Absolute path of the produced executable
    fn executable(&self) -> PathBuf;

    /// Remove the build output directory if present
    fn clean(&self, _ctx: &BuildContext) -> Result<CleanOutcome> {
        let path = self.build_dir();
        Ok(match remove_dir_if_present(&path)? {
            Some(bytes) => CleanOutcome::Removed { path, bytes },
            None => CleanOutcome::Absent { path },
        })
    }

    /// Create the build output directory if needed, then run the build steps
    fn build(&self, ctx: &BuildContext) -> Result<BuildReport>;

    /// Execute the produced artifact with `args`
    fn run(&self, ctx: &BuildContext, args: &[OsString]) -> Result<RunOutcome>;
}
