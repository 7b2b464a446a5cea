//! CLI module for cattery
//!
//! Provides command-line interface for:
//! - init: Create an empty table file
//! - serve: Open the table and serve the HTTP API

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command, SettingsArgs};
pub use commands::{init, load_config_file, open_store, resolve_config, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse the process arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
