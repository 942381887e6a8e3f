//! Ordered execution of external build steps
//!
//! A pipeline runs its steps one at a time, each blocking until the child
//! exits. Under [`FailurePolicy::Abort`] the first failing step ends the
//! pipeline with an error; under [`FailurePolicy::Continue`] failures are
//! reported as warnings and the next step still runs.

use std::time::Duration;

use anyhow::Result;

use super::BuildContext;
use crate::config::FailurePolicy;
use crate::error::MngError;
use crate::exec::subprocess::SpawnError;
use crate::exec::CommandSpec;
use crate::utils::terminal::print_warning;

/// One external process invocation within a pipeline
#[derive(Debug, Clone)]
pub struct Step {
    /// Short step name: configure, compile, run
    pub label: &'static str,
    pub command: CommandSpec,
}

/// Outcome of one step
#[derive(Debug, Clone)]
pub struct StepReport {
    pub label: &'static str,
    /// False if the process could not be started
    pub spawned: bool,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

/// Ordered list of steps for one target
#[derive(Debug, Clone)]
pub struct Pipeline {
    target: String,
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    pub fn step(mut self, label: &'static str, command: CommandSpec) -> Self {
        self.steps.push(Step { label, command });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Run every step in order, honouring the context's failure policy
    pub fn execute(&self, ctx: &BuildContext) -> Result<Vec<StepReport>> {
        let mut reports = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            tracing::debug!(
                target_name = %self.target,
                step = step.label,
                cwd = ?step.command.cwd,
                "running {}",
                step.command
            );

            let report = match ctx.runner.run(&step.command) {
                Ok(result) => {
                    tracing::debug!(
                        step = step.label,
                        exit_code = ?result.exit_code,
                        elapsed_ms = result.duration.as_millis() as u64,
                        "{} finished",
                        step.command.program_name()
                    );
                    let report = StepReport {
                        label: step.label,
                        spawned: true,
                        success: result.success,
                        exit_code: result.exit_code,
                        duration: result.duration,
                    };
                    if !result.success {
                        self.fail(
                            ctx,
                            MngError::StepFailed {
                                target: self.target.clone(),
                                step: step.label.to_string(),
                                code: result.exit_code,
                            },
                        )?;
                    }
                    report
                }
                Err(err) => {
                    let error = match err {
                        SpawnError::NotOnPath(tool) => MngError::missing_tool(
                            tool,
                            format!("{} step of {}", step.label, self.target),
                        ),
                        SpawnError::Io(source) => MngError::Spawn {
                            target: self.target.clone(),
                            step: step.label.to_string(),
                            program: step.command.program_name(),
                            source,
                        },
                    };
                    self.fail(ctx, error)?;
                    StepReport {
                        label: step.label,
                        spawned: false,
                        success: false,
                        exit_code: None,
                        duration: Duration::ZERO,
                    }
                }
            };
            reports.push(report);
        }

        Ok(reports)
    }

    /// Abort with `error`, or downgrade it to a warning
    fn fail(&self, ctx: &BuildContext, error: MngError) -> Result<()> {
        match ctx.policy {
            FailurePolicy::Abort => Err(error.into()),
            FailurePolicy::Continue => {
                tracing::debug!(target_name = %self.target, "continuing past: {}", error);
                print_warning(&format!("{} (continuing)", error));
                Ok(())
            }
        }
    }
}
