//! CLI module for campusdb
//!
//! Provides a one-shot command line over a catalog:
//! - init: create the data directory
//! - stats: store shapes and counters
//! - show / get / find: read records
//! - add / delete: integrity-checked mutations

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, run_command};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::write_response;

/// Parse arguments and run the chosen command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command, &cli.config)
}
