//! CLI module for reeldb
//!
//! Provides command-line interface for:
//! - init: Create directory structure
//! - one-shot queries and mutations (get, title, prefix, year, years,
//!   genre, range, insert, modify, delete, path, stats, verify)
//! - serve: Boot once and answer JSON requests line by line

mod args;
mod commands;
mod config;
mod errors;
mod io;
mod request;

pub use args::{Cli, Command};
pub use commands::{boot, init, run, run_command, serve, serve_requests};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
pub use request::Request;
