//! CLI module - argument parsing, interactive prompts and the lookup loop

mod args;
pub mod lookup;
mod prompts;

pub use args::{Cli, Commands};
pub use lookup::*;
pub use prompts::*;
