//! CLI argument definitions using clap
//!
//! Commands:
//! - campusdb --config <path> init
//! - campusdb --config <path> stats
//! - campusdb --config <path> show <kind>
//! - campusdb --config <path> get <kind> <id>
//! - campusdb --config <path> find <kind> <key>
//! - campusdb --config <path> add <kind> <line>
//! - campusdb --config <path> delete <kind> <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::store::{EntityKind, RecordId};

/// campusdb - file-backed campus records
#[derive(Parser, Debug)]
#[command(name = "campusdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./campusdb.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and report what it holds
    Init,

    /// Print store shapes and operation counters
    Stats,

    /// Print every record of a kind in id order
    Show {
        /// department, instructor, student, course, enrollment or phone
        kind: EntityKind,
    },

    /// Print one record by primary key
    Get { kind: EntityKind, id: RecordId },

    /// Print the record indexed under a secondary key
    Find { kind: EntityKind, key: String },

    /// Insert a record given in its file line layout
    ///
    /// For phone numbers pass `<instructor_id> <phone>`; the id is assigned.
    Add { kind: EntityKind, line: String },

    /// Delete a record by primary key
    Delete { kind: EntityKind, id: RecordId },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
