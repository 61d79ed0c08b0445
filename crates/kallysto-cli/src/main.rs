//! Kallysto CLI - publish notebook results into document projects.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable consulted before `RUST_LOG`.
const LOG_ENV: &str = "KALLYSTO_LOG";

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("kallysto={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let args = &cli.publication;
    let result = match cli.command {
        Commands::Init {
            overwrite,
            fresh_start,
        } => commands::init::run(args, overwrite, fresh_start, cli.verbose),

        Commands::Value { name, value } => commands::value::run(args, name, value, cli.verbose),

        Commands::Table {
            name,
            file,
            caption,
        } => commands::table::run(args, name, file, caption, cli.verbose),

        Commands::Figure {
            name,
            image,
            data,
            caption,
            width,
        } => commands::figure::run(args, name, image, data, caption, width, cli.verbose),

        Commands::Log { all, json } => commands::log::run(args, all, json, cli.verbose),

        Commands::Convert { file, include } => commands::convert::run(file, include, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
