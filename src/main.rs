//! pagewright - static-site asset pipeline.

mod bundle;
mod cli;
mod config;
mod context;
mod logger;
mod pipeline;
mod reload;
mod serve;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{BuildConfig, init_config};

fn main() -> Result<()> {
    // Ctrl+C handler must exist before the server can block on accept()
    serve::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(BuildConfig::load(cli)?);

    match &cli.command {
        Commands::Clean => task::clean::run(&config),
        Commands::Build => pipeline::run_production(&config),
        Commands::Serve { .. } => serve::serve(&config),
    }
}
