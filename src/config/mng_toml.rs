//! mng.toml configuration parsing
//!
//! Every section and key is optional; an empty or missing file yields the
//! layout of the qcc repository:
//!
//! ```toml
//! [tools]
//! generator = "cmake"
//! build_tool = "make"
//!
//! [compiler]
//! name = "qcc"
//! strategy = "generator"
//! executable = "bin/qcc"
//!
//! [test]
//! name = "qcc_test"
//! root = "unittest"
//! executable = "qcc_test"
//!
//! [policy]
//! on_failure = "abort"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::validation::validate_config;
use crate::error::MngError;

/// Default configuration file name, looked up in the workspace root
pub const CONFIG_FILE: &str = "mng.toml";

/// Root configuration from mng.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MngConfig {
    /// External tool names and extra arguments
    #[serde(default)]
    pub tools: ToolsConfig,

    /// The primary program target
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// The unit test target
    #[serde(default)]
    pub test: TestConfig,

    /// What to do when an external step fails
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// External tools from the [tools] section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Configure step program
    pub generator: String,
    /// Extra arguments appended after the source directory
    pub generator_args: Vec<String>,
    /// Compile step program
    pub build_tool: String,
    pub build_tool_args: Vec<String>,
    /// Compiler used by the direct strategy
    pub compiler: String,
    pub compiler_flags: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            generator: "cmake".to_string(),
            generator_args: Vec::new(),
            build_tool: "make".to_string(),
            build_tool_args: Vec::new(),
            compiler: "cc".to_string(),
            compiler_flags: Vec::new(),
        }
    }
}

/// How the compiler target gets built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStrategy {
    /// Generator then build tool
    #[default]
    Generator,
    /// One compiler invocation over the workspace sources
    Direct,
}

impl std::fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStrategy::Generator => write!(f, "generator"),
            BuildStrategy::Direct => write!(f, "direct"),
        }
    }
}

/// The [compiler] section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub name: String,
    pub strategy: BuildStrategy,
    /// Produced executable, relative to `<workspace>/build`
    pub executable: PathBuf,
    /// Extensions picked up by the direct strategy
    pub source_extensions: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            name: "qcc".to_string(),
            strategy: BuildStrategy::Generator,
            executable: PathBuf::from("bin").join("qcc"),
            source_extensions: vec!["c".to_string()],
        }
    }
}

/// The [test] section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub name: String,
    /// Test suite workspace, relative to the main workspace
    pub root: PathBuf,
    /// Produced test runner, relative to `<workspace>/<root>/build`
    pub executable: PathBuf,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            name: "qcc_test".to_string(),
            root: PathBuf::from("unittest"),
            executable: PathBuf::from("qcc_test"),
        }
    }
}

/// Failure handling for external steps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing step and exit non-zero
    #[default]
    Abort,
    /// Warn and carry on with the next step
    Continue,
}

/// The [policy] section
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub on_failure: FailurePolicy,
}

impl MngConfig {
    /// Load configuration for a workspace.
    ///
    /// An explicit path must exist. Without one, `<workspace>/mng.toml` is
    /// used if present and the defaults otherwise.
    pub fn load(workspace: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                let path = workspace.join(path);
                if !path.is_file() {
                    return Err(MngError::config_error_with_hint(
                        format!("{} does not exist", path.display()),
                        None,
                        "Pass an existing file to --config, or drop the flag to use mng.toml",
                    )
                    .into());
                }
                Self::load_from_path(&path)
            }
            None => {
                let path = workspace.join(CONFIG_FILE);
                if path.is_file() {
                    Self::load_from_path(&path)
                } else {
                    tracing::debug!(
                        "no {} in {}, using defaults",
                        CONFIG_FILE,
                        workspace.display()
                    );
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        tracing::debug!("loaded configuration from {}", path.display());
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            MngError::config_error_with_hint(
                format!("Failed to parse {}", CONFIG_FILE),
                Some(e.into()),
                "Check the TOML syntax; every section and key is optional",
            )
        })?;

        validate_config(&config)?;
        Ok(config)
    }
}
