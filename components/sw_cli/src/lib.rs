//! GridPrint offline cache CLI library
//!
//! Inspects the compiled deployment of the offline cache controller:
//! the precache manifest, how requests are routed and what a persisted
//! cache snapshot contains.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};
