//! campusdb CLI entry point
//!
//! Parses arguments, runs one command and exits non-zero on failure.
//! All logic lives in the `cli` module.

use campusdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
