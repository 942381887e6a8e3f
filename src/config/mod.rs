//! Configuration loading for mng.toml

mod mng_toml;
mod validation;

pub use mng_toml::{
    BuildStrategy, CompilerConfig, FailurePolicy, MngConfig, TestConfig, ToolsConfig,
};
