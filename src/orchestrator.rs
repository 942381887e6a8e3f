//! Top-level commands over the target registry
//!
//! The registry is fixed at construction: the compiler first, then the unit
//! tests. `clean_all` and `build_all` walk it in that order.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::build::targets::{print_run_usage, CompilerTarget, TestTarget};
use crate::build::{BuildContext, CleanOutcome, RunOutcome, Target, TargetKind};
use crate::utils::paths::{display_relative, format_size};
use crate::utils::terminal::{print_info, print_success, print_warning};

/// The one top-level command an invocation performs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Build every target
    BuildAll,
    /// Remove every build output directory
    CleanAll,
    /// Build and run the unit tests
    Test,
    /// Build the compiler and run it on a file
    Run(Option<PathBuf>),
}

pub struct Orchestrator<'a> {
    ctx: BuildContext<'a>,
    targets: Vec<Box<dyn Target>>,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator with the compiler and test targets registered
    pub fn new(ctx: BuildContext<'a>) -> Self {
        let targets: Vec<Box<dyn Target>> = vec![
            Box::new(CompilerTarget::new(&ctx.workspace, &ctx.config.compiler)),
            Box::new(TestTarget::new(&ctx.workspace, &ctx.config.test)),
        ];
        Self { ctx, targets }
    }

    pub fn targets(&self) -> &[Box<dyn Target>] {
        &self.targets
    }

    /// Dispatch one action
    pub fn execute(&self, action: Action) -> Result<()> {
        tracing::debug!(?action, workspace = %self.ctx.workspace.display(), "dispatching");
        match action {
            Action::BuildAll => self.build_all(),
            Action::CleanAll => self.clean_all(),
            Action::Test => self.test(),
            Action::Run(file) => self.run(file),
        }
    }

    /// Remove the build output directory of every target
    pub fn clean_all(&self) -> Result<()> {
        print_info("Removing all compiled files!");
        for target in self.targets() {
            let outcome = target
                .clean(&self.ctx)
                .with_context(|| format!("Failed to clean {}", target.name()))?;
            match outcome {
                CleanOutcome::Removed { path, bytes } => println!(
                    "  Removed: {} ({})",
                    self.relative(&path),
                    format_size(bytes)
                ),
                CleanOutcome::Absent { path } => {
                    println!("  Nothing to clean: {}", self.relative(&path))
                }
            }
        }
        Ok(())
    }

    /// Build every target in registration order
    pub fn build_all(&self) -> Result<()> {
        print_info("Build all!");
        for target in self.targets() {
            self.build_one(target.as_ref())?;
        }
        Ok(())
    }

    /// Build and run the unit tests
    pub fn test(&self) -> Result<()> {
        let target = self.target(TargetKind::Tests)?;
        self.build_one(target)?;

        print_info("Running tests...");
        if let RunOutcome::Completed(report) = target.run(&self.ctx, &[])? {
            if report.success {
                print_success(&format!(
                    "{} passed in {:.2}s",
                    target.name(),
                    report.duration.as_secs_f64()
                ));
            }
        }
        Ok(())
    }

    /// Build the compiler and run it on `file`.
    ///
    /// Without a file only the usage is printed; nothing is built or spawned.
    pub fn run(&self, file: Option<PathBuf>) -> Result<()> {
        let Some(file) = file else {
            print_run_usage();
            return Ok(());
        };

        let target = self.target(TargetKind::Compiler)?;
        self.build_one(target)?;

        print_info(&format!("Running {}...", target.name()));
        target.run(&self.ctx, &[OsString::from(file)])?;
        Ok(())
    }

    fn build_one(&self, target: &dyn Target) -> Result<()> {
        let report = target
            .build(&self.ctx)
            .with_context(|| format!("Failed to build {}", target.name()))?;

        if report.all_succeeded() {
            print_success(&format!(
                "{} built in {:.2}s ({})",
                target.name(),
                report.duration.as_secs_f64(),
                self.relative(&target.build_dir())
            ));
        } else {
            let failed: Vec<String> = report
                .steps
                .iter()
                .filter(|step| !step.success)
                .map(|step| match (step.spawned, step.exit_code) {
                    (false, _) => format!("{} (not started)", step.label),
                    (true, Some(code)) => format!("{} (exit {})", step.label, code),
                    (true, None) => step.label.to_string(),
                })
                .collect();
            print_warning(&format!(
                "{} finished with failing steps: {}",
                target.name(),
                failed.join(", ")
            ));
        }
        Ok(())
    }

    fn target(&self, kind: TargetKind) -> Result<&dyn Target> {
        self.targets
            .iter()
            .find(|t| t.kind() == kind)
            .map(|t| t.as_ref())
            .with_context(|| format!("No {:?} target registered", kind))
    }

    fn relative(&self, path: &std::path::Path) -> String {
        display_relative(path, &self.ctx.workspace)
    }
}
