//! Generator and build tool invocation
//!
//! The configure step runs the generator (cmake by default) inside the build
//! directory with the target root as its source argument. The compile step
//! then runs the build tool (make by default) in the same directory.

use std::path::PathBuf;

use super::pipeline::Pipeline;
use crate::config::ToolsConfig;
use crate::exec::CommandSpec;

/// Generator + build tool configuration builder
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Source directory handed to the generator
    source_dir: PathBuf,
    /// Build directory, the working directory of both steps
    build_dir: PathBuf,
    generator: String,
    generator_args: Vec<String>,
    build_tool: String,
    build_tool_args: Vec<String>,
}

impl GeneratorConfig {
    /// Create a configuration from the [tools] section
    pub fn from_tools(source_dir: PathBuf, build_dir: PathBuf, tools: &ToolsConfig) -> Self {
        Self {
            source_dir,
            build_dir,
            generator: tools.generator.clone(),
            generator_args: tools.generator_args.clone(),
            build_tool: tools.build_tool.clone(),
            build_tool_args: tools.build_tool_args.clone(),
        }
    }

    /// Configure step command
    pub fn configure(&self) -> CommandSpec {
        CommandSpec::new(&self.generator)
            .arg(&self.source_dir)
            .args(&self.generator_args)
            .current_dir(&self.build_dir)
    }

    /// Compile step command
    pub fn compile(&self) -> CommandSpec {
        CommandSpec::new(&self.build_tool)
            .args(&self.build_tool_args)
            .current_dir(&self.build_dir)
    }

    /// Configure followed by compile
    pub fn pipeline(&self, target: &str) -> Pipeline {
        Pipeline::new(target)
            .step("configure", self.configure())
            .step("compile", self.compile())
    }
}
