//! Unit test target
//!
//! Builds the test suite in its own subdirectory with the generator and build
//! tool, then runs the produced test runner without arguments.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;

use crate::build::generator::GeneratorConfig;
use crate::build::{BuildContext, BuildReport, Pipeline, RunOutcome, Target, TargetKind};
use crate::config::TestConfig;
use crate::exec::CommandSpec;
use crate::utils::paths::ensure_dir;

/// The unit test suite
#[derive(Debug, Clone)]
pub struct TestTarget {
    name: String,
    root: PathBuf,
    /// Relative to the build directory
    executable: PathBuf,
}

impl TestTarget {
    pub fn new(workspace: &Path, config: &TestConfig) -> Self {
        Self {
            name: config.name.clone(),
            root: workspace.join(&config.root),
            executable: config.executable.clone(),
        }
    }
}

impl Target for TestTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TargetKind {
        TargetKind::Tests
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn executable(&self) -> PathBuf {
        self.build_dir().join(&self.executable)
    }

    fn build(&self, ctx: &BuildContext) -> Result<BuildReport> {
        let start = Instant::now();
        let build_dir = self.build_dir();
        ensure_dir(&build_dir)?;

        let steps = GeneratorConfig::from_tools(self.root.clone(), build_dir, &ctx.config.tools)
            .pipeline(&self.name)
            .execute(ctx)?;

        Ok(BuildReport {
            steps,
            duration: start.elapsed(),
        })
    }

    fn run(&self, ctx: &BuildContext, args: &[OsString]) -> Result<RunOutcome> {
        let command = CommandSpec::new(self.executable()).args(args);
        let mut reports = Pipeline::new(&self.name).step("run", command).execute(ctx)?;
        Ok(RunOutcome::Completed(reports.remove(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MngConfig;
    use crate::error::MngError;
    use crate::exec::subprocess::testing::RecordingRunner;
    use tempfile::TempDir;

    #[test]
    fn test_build_scoped_to_subdirectory() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new(temp.path().into(), MngConfig::default(), &runner);
        let target = TestTarget::new(temp.path(), &ctx.config.test);

        target.build(&ctx).unwrap();

        let unittest = temp.path().join("unittest");
        assert!(unittest.join("build").is_dir());
        assert!(!temp.path().join("build").exists());

        let calls = runner.calls();
        assert_eq!(runner.programs(), vec!["cmake", "make"]);
        assert_eq!(calls[0].args, vec![unittest.as_os_str().to_os_string()]);
        assert_eq!(calls[0].cwd.as_deref(), Some(unittest.join("build").as_path()));
    }

    #[test]
    fn test_run_has_no_arguments() {
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new("/work".into(), MngConfig::default(), &runner);
        let target = TestTarget::new(Path::new("/work"), &ctx.config.test);

        target.run(&ctx, &[]).unwrap();

        let calls = runner.calls();
        assert_eq!(calls[0].program, Path::new("/work/unittest/build/qcc_test"));
        assert!(calls[0].args.is_empty());
        assert!(calls[0].cwd.is_none());
    }

    #[test]
    fn test_failing_runner_aborts() {
        let runner = RecordingRunner::new().with_exit_code("/work/unittest/build/qcc_test", 3);
        let ctx = BuildContext::new("/work".into(), MngConfig::default(), &runner);
        let target = TestTarget::new(Path::new("/work"), &ctx.config.test);

        let err = target.run(&ctx, &[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MngError>(),
            Some(MngError::StepFailed { code: Some(3), .. })
        ));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let ctx = BuildContext::new(temp.path().into(), MngConfig::default(), &runner);
        let target = TestTarget::new(temp.path(), &ctx.config.test);

        target.build(&ctx).unwrap();
        assert!(matches!(
            target.clean(&ctx).unwrap(),
            crate::build::CleanOutcome::Removed { .. }
        ));
        assert!(!target.build_dir().exists());
        assert!(matches!(
            target.clean(&ctx).unwrap(),
            crate::build::CleanOutcome::Absent { .. }
        ));
    }
}
