// CLI layer - argument parsing, command handlers and terminal output.

#[path = "args.rs"]
pub mod args;

#[path = "commands.rs"]
pub mod commands;

#[path = "render.rs"]
pub mod render;

pub use args::Cli;
