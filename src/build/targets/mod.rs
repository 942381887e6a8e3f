//! The buildable units mng knows about
//!
//! - `compiler` - The primary program, built at the workspace root
//! - `tests` - The unit test suite, built in its own subdirectory

pub mod compiler;
pub mod tests;

pub use compiler::CompilerTarget;
pub use tests::TestTarget;

use crate::utils::terminal::{print_info, print_usage};

/// Printed when the compiler is asked to run without a file
pub const RUN_USAGE: &str = "mng --run <file>";

/// Tell the user `--run` needs a file
pub fn print_run_usage() {
    print_info("You must pass the file to compile!");
    print_usage(RUN_USAGE);
}
