//! Configuration validation with helpful error messages

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use super::{BuildStrategy, MngConfig};
use crate::error::MngError;
use crate::utils::paths::BUILD_DIR;

/// Validate the entire mng configuration
pub fn validate_config(config: &MngConfig) -> Result<()> {
    validate_program("tools.generator", &config.tools.generator)?;
    validate_program("tools.build_tool", &config.tools.build_tool)?;
    validate_program("compiler.name", &config.compiler.name)?;
    validate_program("test.name", &config.test.name)?;

    if config.compiler.strategy == BuildStrategy::Direct {
        validate_program("tools.compiler", &config.tools.compiler)?;
        if config.compiler.source_extensions.is_empty() {
            return Err(MngError::config_error_with_hint(
                "compiler.source_extensions is empty",
                None,
                "The direct strategy needs at least one extension, e.g. source_extensions = [\"c\"]",
            )
            .into());
        }
    }

    validate_relative("compiler.executable", &config.compiler.executable)?;
    validate_relative("test.executable", &config.test.executable)?;
    validate_relative("test.root", &config.test.root)?;

    let test_root: PathBuf = config
        .test
        .root
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    if test_root.starts_with(BUILD_DIR) {
        return Err(MngError::config_error_with_hint(
            format!(
                "test.root = {:?} lies inside the compiler's build directory",
                config.test.root
            ),
            None,
            "Cleaning the compiler would delete the test suite; pick another test.root",
        )
        .into());
    }

    Ok(())
}

fn validate_program(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MngError::config_error_with_hint(
            format!("{} cannot be empty", key),
            None,
            format!("Remove {} from mng.toml to use the default", key),
        )
        .into());
    }
    Ok(())
}

/// Paths must stay below the directory they are resolved against, which
/// keeps the two target workspaces disjoint.
fn validate_relative(key: &str, path: &Path) -> Result<()> {
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    let empty = !path.components().any(|c| matches!(c, Component::Normal(_)));

    if escapes || empty {
        return Err(MngError::config_error_with_hint(
            format!("{} = {:?} must be a non-empty relative path", key, path),
            None,
            format!("Use a path like \"unittest\" without '..' or a leading '/' for {}", key),
        )
        .into());
    }
    Ok(())
}
