//! Command line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Origin used when none is given
pub const DEFAULT_ORIGIN: &str = "https://gridprint.app";

/// Inspect the GridPrint offline cache deployment
#[derive(Debug, Parser)]
#[command(name = "gridprint-sw", version)]
pub struct Cli {
    /// Origin the controller is installed on
    #[arg(long, short = 'o', default_value = DEFAULT_ORIGIN, global = true)]
    pub origin: String,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print the cache name, precache manifest and API prefixes
    Manifest {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show how a request would be routed
    Classify {
        /// Absolute request URL
        url: String,

        /// HTTP method
        #[arg(long, short = 'X', default_value = "GET")]
        method: String,

        /// Value of the Accept header
        #[arg(long)]
        accept: Option<String>,

        /// Treat the request as a full-page navigation
        #[arg(long)]
        navigate: bool,
    },

    /// List the buckets and entries of a persisted cache snapshot
    Inspect {
        /// Snapshot file written by `CacheStorage::to_snapshot`
        snapshot: PathBuf,
    },
}
