//! CLI module - argument parsing and interactive prompts

mod args;
mod prompts;

pub use args::{derived_path, Cli, Commands};
pub use prompts::*;
