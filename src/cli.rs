//! CLI argument parsing using clap derive macros

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};

use crate::build::BuildContext;
use crate::config::{FailurePolicy, MngConfig};
use crate::error::MngError;
use crate::exec::SystemRunner;
use crate::build::targets::print_run_usage;
use crate::orchestrator::{Action, Orchestrator};
use crate::utils::terminal::{disable_colors, print_error};

/// mng - build, test and run qcc
///
/// Without an action flag, builds the compiler and the unit tests.
#[derive(Parser, Debug)]
#[command(name = "mng")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("action").args(["clean", "test", "run"])))]
pub struct Cli {
    /// Remove the build directories of every target
    #[arg(long)]
    pub clean: bool,

    /// Build and run the unit tests
    #[arg(long)]
    pub test: bool,

    /// Build the compiler and run it on FILE
    #[arg(long, value_name = "FILE", num_args = 0..=1, allow_hyphen_values = true)]
    pub run: Option<Option<PathBuf>>,

    /// Keep going after a failing step instead of aborting
    #[arg(long)]
    pub keep_going: bool,

    /// Configuration file (defaults to ./mng.toml when present)
    #[arg(long, env = "MNG_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Anything after the action; ignored, or rejected when no action is given
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub rest: Vec<OsString>,
}

impl Cli {
    /// The single action selected by the flags.
    ///
    /// Leftover arguments are ignored after an action flag. Without one they
    /// are an unrecognized command.
    pub fn action(&self) -> Result<Action, MngError> {
        let action = if self.clean {
            Action::CleanAll
        } else if self.test {
            Action::Test
        } else if let Some(file) = &self.run {
            Action::Run(file.clone())
        } else if let Some(first) = self.rest.first() {
            return Err(MngError::UnknownCommand {
                message: format!("unrecognized command '{}'", first.to_string_lossy()),
            });
        } else {
            Action::BuildAll
        };

        if !self.rest.is_empty() {
            tracing::debug!(ignored = ?self.rest, "ignoring arguments after {:?}", action);
        }
        Ok(action)
    }

    /// Execute the CLI command in the current directory
    pub fn execute(self) -> Result<()> {
        if self.no_color {
            disable_colors();
        }

        let action = self.action()?;
        if action == Action::Run(None) {
            print_run_usage();
            return Ok(());
        }

        let workspace = std::env::current_dir().context("Failed to get current directory")?;
        let config = MngConfig::load(&workspace, self.config.as_deref())?;

        let runner = SystemRunner;
        let mut ctx = BuildContext::new(workspace, config, &runner);
        if self.keep_going {
            ctx = ctx.with_policy(FailurePolicy::Continue);
        }

        Orchestrator::new(ctx).execute(action)
    }
}

/// Report a parse failure and pick the exit status.
///
/// `--help` and `--version` exit 0; anything unrecognized exits 1.
pub fn report_parse_error(err: clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            0
        }
        _ => {
            let rendered = err.to_string();
            let first_line = rendered.lines().next().unwrap_or_default();
            let message = first_line.strip_prefix("error: ").unwrap_or(first_line);
            let error = MngError::UnknownCommand {
                message: message.to_string(),
            };
            print_error(&error.to_string());
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("mng").chain(args.iter().copied()))
    }

    /// Exit status for input that never reaches a target
    fn rejected_with(args: &[&str]) -> Option<u8> {
        match parse(args) {
            Err(err) => Some(report_parse_error(err)),
            Ok(cli) => cli.action().err().map(|_| 1),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_actions() {
        let action = |args: &[&str]| parse(args).unwrap().action().unwrap();
        assert_eq!(action(&[]), Action::BuildAll);
        assert_eq!(action(&["--clean"]), Action::CleanAll);
        assert_eq!(action(&["--test"]), Action::Test);
        assert_eq!(action(&["--run"]), Action::Run(None));
        assert_eq!(
            action(&["--run", "hello.q"]),
            Action::Run(Some(PathBuf::from("hello.q")))
        );
    }

    #[test]
    fn test_run_file_is_passed_through() {
        let cli = parse(&["--run", "-x.q"]).unwrap();
        assert_eq!(cli.action().unwrap(), Action::Run(Some(PathBuf::from("-x.q"))));
    }

    #[test]
    fn test_arguments_after_action_are_ignored() {
        let cli = parse(&["--clean", "extra"]).unwrap();
        assert_eq!(cli.action().unwrap(), Action::CleanAll);

        let cli = parse(&["--run", "a.q", "b.q"]).unwrap();
        assert_eq!(cli.action().unwrap(), Action::Run(Some(PathBuf::from("a.q"))));
    }

    #[test]
    fn test_options_combine_with_actions() {
        let cli = parse(&["--test", "--keep-going", "-v"]).unwrap();
        assert!(cli.keep_going);
        assert!(cli.verbose);
        assert_eq!(cli.action().unwrap(), Action::Test);
    }

    #[test]
    fn test_unknown_input_is_exit_1() {
        for args in [&["--bogus"][..], &["build"][..], &["--clean", "--test"][..]] {
            assert_eq!(rejected_with(args), Some(1), "args {args:?}");
        }
    }

    #[test]
    fn test_unknown_first_token_names_it() {
        let err = parse(&["build", "--clean"]).unwrap().action().unwrap_err();
        assert!(err.to_string().contains("'build'"));
    }

    #[test]
    fn test_help_is_exit_0() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
