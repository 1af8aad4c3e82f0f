//! GridPrint offline cache CLI
//!
//! Entry point. Parses arguments, sets up logging on stderr and prints the
//! output of the chosen subcommand.

use clap::Parser as ClapParser;
use offline_cache::{CacheConfig, Origin};
use sw_cli::{commands, Cli, CliResult, Command};
use tracing_subscriber::EnvFilter;

fn run(cli: Cli) -> CliResult<String> {
    let origin = Origin::parse(&cli.origin)?;
    let config = CacheConfig::new(origin.clone());

    match cli.command {
        Command::Manifest { json } => commands::manifest(&config, json),
        Command::Classify {
            url,
            method,
            accept,
            navigate,
        } => commands::classify_request(&config, &url, &method, accept.as_deref(), navigate),
        Command::Inspect { snapshot } => commands::inspect(origin, &snapshot),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
