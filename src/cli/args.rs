//! CLI argument definitions using clap
//!
//! Commands:
//! - reeldb init --config <path>
//! - reeldb stats | verify --config <path>
//! - reeldb get | title | prefix | year | years | genre | range ... --config <path>
//! - reeldb insert | modify | delete ... --config <path>
//! - reeldb path --attribute <name> --from <a> --to <b> --config <path>
//! - reeldb serve --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reeldb - embedded movie catalog with ordered secondary indexes
#[derive(Parser, Debug)]
#[command(name = "reeldb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only log errors, keeping stdout for responses
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
    },

    /// Print record and index counts
    Stats {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
    },

    /// Check that the records and all indexes agree
    Verify {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
    },

    /// Look up a record by id
    Get {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        id: u64,
    },

    /// Look up a record by exact title
    Title {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        title: String,
    },

    /// Records whose title starts with a prefix
    Prefix {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        prefix: String,
    },

    /// Records released in a year
    Year {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        year: i32,
    },

    /// Records released in a range of years, both ends included
    Years {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        from: i32,
        #[arg(long, allow_hyphen_values = true)]
        to: i32,
    },

    /// Records tagged with a genre
    Genre {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        genre: String,
    },

    /// Records whose numeric attribute lies within bounds (full scan)
    Range {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        field: String,
        #[arg(long, allow_hyphen_values = true)]
        min: f64,
        #[arg(long, allow_hyphen_values = true)]
        max: f64,
    },

    /// Insert the record read from stdin
    Insert {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
    },

    /// Apply the changes read from stdin to a record
    Modify {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        id: u64,
    },

    /// Delete a record
    Delete {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        id: u64,
    },

    /// Shortest co-occurrence path between two values of a list attribute
    Path {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
        #[arg(long)]
        attribute: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Boot and answer JSON requests from stdin, one per line
    Serve {
        #[arg(long, default_value = "./reeldb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
