//! CLI module - argument parsing, interactive prompts and subcommands

mod args;
pub mod options;
mod prompts;

pub use args::{Cli, Commands};
pub use options::run_options;
pub use prompts::*;
