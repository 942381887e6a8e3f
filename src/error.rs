//! Error types and helpers for user-friendly error messages
//!
//! Every failure that ends an `mng` invocation with a non-zero status is one of
//! these variants. Most carry a hint telling the user how to get unstuck.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the orchestrator
#[derive(Error, Debug)]
pub enum MngError {
    /// First argument is not a recognized command
    #[error("Nothing to do: {message}")]
    UnknownCommand { message: String },

    /// mng.toml could not be read, parsed or validated
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Tool/executable not found on PATH
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// External process could not be started
    #[error("Failed to execute {program} ({step} step of {target})")]
    Spawn {
        target: String,
        step: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// External process exited with a non-zero status
    #[error("{step} step of {target} failed with {}", describe_code(.code))]
    StepFailed {
        target: String,
        step: String,
        code: Option<i32>,
    },

    /// Build output directory could not be created or removed
    #[error("Filesystem error on {}: {action}", .path.display())]
    Filesystem {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Direct compile strategy found nothing to compile
    #[error("No source files with extensions {extensions:?} in {}", .root.display())]
    NoSources {
        root: PathBuf,
        extensions: Vec<String>,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl MngError {
    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error, picking a hint from the tool name
    pub fn missing_tool(tool: impl Into<String>, required_for: impl Into<String>) -> Self {
        let tool = tool.into();
        let hint = hints::for_tool(&tool);
        Self::MissingTool {
            tool,
            required_for: required_for.into(),
            hint,
        }
    }

    /// Create a filesystem error
    pub fn filesystem(
        path: impl Into<PathBuf>,
        action: &'static str,
        source: std::io::Error,
    ) -> Self {
        Self::Filesystem {
            path: path.into(),
            action,
            source,
        }
    }

    fn hint(&self) -> Option<String> {
        match self {
            MngError::UnknownCommand { .. } => Some(hints::usage().to_string()),
            MngError::Config { hint, .. } => hint.clone(),
            MngError::MissingTool { hint, .. } => Some(hint.clone()),
            MngError::Spawn { program, .. } => Some(format!(
                "Check that {} exists and is executable. Run `mng` without arguments to build first.",
                program
            )),
            MngError::StepFailed { .. } => Some(
                "Scroll up for the tool's own output. Pass --keep-going to continue past failing steps."
                    .to_string(),
            ),
            MngError::Filesystem { .. } => {
                Some("Check permissions on the workspace directory.".to_string())
            }
            MngError::NoSources { .. } => Some(
                "Set [compiler] source_extensions in mng.toml or switch to strategy = \"generator\"."
                    .to_string(),
            ),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;
        use std::error::Error as _;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        let mut source = self.source();
        while let Some(cause) = source {
            eprintln!("  {} {}", style("caused by:").dim(), cause);
            source = cause.source();
        }

        if let Some(hint) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
        }

        if let MngError::MissingTool { required_for, .. } = self {
            eprintln!("\n{} {}", style("REQUIRED FOR:").cyan().bold(), required_for);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Usage summary printed for unknown commands
    pub fn usage() -> &'static str {
        "Usage:\n\
         • mng              build the compiler and the unit tests\n\
         • mng --clean      remove all build directories\n\
         • mng --test       build and run the unit tests\n\
         • mng --run <file> build the compiler and run it on <file>"
    }

    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake\n\
         • Windows: winget install Kitware.CMake"
    }

    /// Get hint for missing make
    pub fn make() -> &'static str {
        "Install GNU Make with your package manager:\n\
         • macOS: xcode-select --install\n\
         • Ubuntu: sudo apt install build-essential"
    }

    /// Get hint for a missing C compiler
    pub fn c_compiler() -> &'static str {
        "Install a C compiler (gcc or clang):\n\
         • macOS: xcode-select --install\n\
         • Ubuntu: sudo apt install build-essential\n\
         \n\
         Or point [tools] compiler in mng.toml at an installed compiler."
    }

    /// Pick the hint for a tool by its program name
    pub fn for_tool(tool: &str) -> String {
        let name = std::path::Path::new(tool)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(tool);
        match name {
            "cmake" => cmake().to_string(),
            "make" | "gmake" => make().to_string(),
            "cc" | "gcc" | "clang" => c_compiler().to_string(),
            _ => format!(
                "Make sure `{}` is installed and on your PATH, or change [tools] in mng.toml.",
                tool
            ),
        }
    }
}
