//! Compiler target
//!
//! Builds the primary program at the workspace root, either through the
//! generator and build tool or with one direct compiler invocation, and runs
//! it on a user-supplied file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use super::print_run_usage;
use crate::build::generator::GeneratorConfig;
use crate::build::{BuildContext, BuildReport, Pipeline, RunOutcome, Target, TargetKind};
use crate::config::{BuildStrategy, CompilerConfig};
use crate::error::MngError;
use crate::exec::CommandSpec;
use crate::utils::paths::{collect_sources, ensure_dir};

/// The primary program
#[derive(Debug, Clone)]
pub struct CompilerTarget {
    name: String,
    root: PathBuf,
    strategy: BuildStrategy,
    /// Relative to the build directory
    executable: PathBuf,
    source_extensions: Vec<String>,
}

impl CompilerTarget {
    pub fn new(workspace: &Path, config: &CompilerConfig) -> Self {
        Self {
            name: config.name.clone(),
            root: workspace.to_path_buf(),
            strategy: config.strategy,
            executable: config.executable.clone(),
            source_extensions: config.source_extensions.clone(),
        }
    }

    /// Build steps for the configured strategy
    fn pipeline(&self, ctx: &BuildContext) -> Result<Pipeline> {
        match self.strategy {
            BuildStrategy::Generator => Ok(GeneratorConfig::from_tools(
                self.root.clone(),
                self.build_dir(),
                &ctx.config.tools,
            )
            .pipeline(&self.name)),
            BuildStrategy::Direct => self.direct_pipeline(ctx),
        }
    }

    /// One compiler invocation over every source file in the root
    fn direct_pipeline(&self, ctx: &BuildContext) -> Result<Pipeline> {
        let sources = collect_sources(&self.root, &self.source_extensions);
        if sources.is_empty() {
            return Err(MngError::NoSources {
                root: self.root.clone(),
                extensions: self.source_extensions.clone(),
            }
            .into());
        }

        let executable = self.executable();
        if let Some(parent) = executable.parent() {
            ensure_dir(parent)?;
        }

        let command = CommandSpec::new(&ctx.config.tools.compiler)
            .args(&ctx.config.tools.compiler_flags)
            .arg("-o")
            .arg(&executable)
            .args(&sources)
            .current_dir(self.build_dir());

        Ok(Pipeline::new(&self.name).step("compile", command))
    }
}

impl Target for CompilerTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Compiler
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn executable(&self) -> PathBuf {
        self.build_dir().join(&self.executable)
    }

    fn build(&self, ctx: &BuildContext) -> Result<BuildReport> {
        let start = Instant::now();
        ensure_dir(&self.build_dir())?;

        let pipeline = self.pipeline(ctx)?;
        tracing::debug!(
            "building {} with the {} strategy ({} steps)",
            self.name,
            self.strategy,
            pipeline.steps().len()
        );
        let steps = pipeline.execute(ctx)?;

        Ok(BuildReport {
            steps,
            duration: start.elapsed(),
        })
    }

    fn run(&self, ctx: &BuildContext, args: &[OsString]) -> Result<RunOutcome> {
        if args.is_empty() {
            print_run_usage();
            return Ok(RunOutcome::MissingArgument);
        }

        let command = CommandSpec::new(self.executable()).args(args);
        let mut reports = Pipeline::new(&self.name).step("run", command).execute(ctx)?;
        Ok(RunOutcome::Completed(reports.remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FailurePolicy, MngConfig};
    use crate::exec::subprocess::testing::RecordingRunner;
    use tempfile::TempDir;

    fn direct_config() -> MngConfig {
        let mut config = MngConfig::default();
        config.compiler.strategy = BuildStrategy::Direct;
        config.tools.compiler_flags = vec!["-O2".into()];
        config
    }

    #[test]
    fn test_generator_build_creates_dir_and_runs_steps() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new(temp.path().into(), MngConfig::default(), &runner);
        let target = CompilerTarget::new(temp.path(), &ctx.config.compiler);

        let report = target.build(&ctx).unwrap();

        assert!(temp.path().join("build").is_dir());
        assert!(report.all_succeeded());
        let calls = runner.calls();
        assert_eq!(runner.programs(), vec!["cmake", "make"]);
        assert_eq!(calls[0].args, vec![temp.path().as_os_str().to_os_string()]);
        assert_eq!(calls[0].cwd.as_deref(), Some(temp.path().join("build").as_path()));
        assert_eq!(calls[1].cwd, calls[0].cwd);
    }

    #[test]
    fn test_direct_build_compiles_root_sources() {
        let temp = TempDir::new().unwrap();
        for name in ["vm.c", "lexer.c", "common.h"] {
            std::fs::write(temp.path().join(name), "").unwrap();
        }
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new(temp.path().into(), direct_config(), &runner);
        let target = CompilerTarget::new(temp.path(), &ctx.config.compiler);

        target.build(&ctx).unwrap();

        let exe = temp.path().join("build").join("bin").join("qcc");
        assert!(exe.parent().unwrap().is_dir());
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, Path::new("cc"));
        let expected: Vec<OsString> = vec![
            "-O2".into(),
            "-o".into(),
            exe.into(),
            temp.path().join("lexer.c").into(),
            temp.path().join("vm.c").into(),
        ];
        assert_eq!(calls[0].args, expected);
    }

    #[test]
    fn test_direct_build_without_sources_fails() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new(temp.path().into(), direct_config(), &runner)
            .with_policy(FailurePolicy::Continue);
        let target = CompilerTarget::new(temp.path(), &ctx.config.compiler);

        let err = target.build(&ctx).unwrap_err();
        assert!(matches!(err.downcast_ref::<MngError>(), Some(MngError::NoSources { .. })));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_build_twice_tolerates_existing_dir() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new(temp.path().into(), MngConfig::default(), &runner);
        let target = CompilerTarget::new(temp.path(), &ctx.config.compiler);

        target.build(&ctx).unwrap();
        target.build(&ctx).unwrap();
        assert_eq!(runner.calls().len(), 4);
    }

    #[test]
    fn test_run_forwards_file_argument() {
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new("/work".into(), MngConfig::default(), &runner);
        let target = CompilerTarget::new(Path::new("/work"), &ctx.config.compiler);

        let outcome = target.run(&ctx, &["hello.q".into()]).unwrap();

        assert!(matches!(outcome, RunOutcome::Completed(ref r) if r.success));
        let calls = runner.calls();
        assert_eq!(calls[0].program, Path::new("/work/build/bin/qcc"));
        assert_eq!(calls[0].args, vec!["hello.q"]);
        assert!(calls[0].cwd.is_none());
    }

    #[test]
    fn test_run_without_file_spawns_nothing() {
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new("/work".into(), MngConfig::default(), &runner);
        let target = CompilerTarget::new(Path::new("/work"), &ctx.config.compiler);

        let outcome = target.run(&ctx, &[]).unwrap();

        assert!(matches!(outcome, RunOutcome::MissingArgument));
        assert!(runner.calls().is_empty());
    }
}
