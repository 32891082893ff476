mod cli;
mod commands;
mod input;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use manual_core::config::{load_dotenv, Config};

use crate::cli::{CliArgs, Command};

fn run(args: CliArgs, config: &Config) -> Result<ExitCode> {
    match args.command {
        Command::Process {
            profile,
            input,
            output_dir,
        } => commands::process(config, &profile, &input, output_dir),
        Command::Validate {
            profile,
            input,
            diagnostics,
        } => commands::validate(config, &profile, &input, diagnostics),
        Command::ValidateChunks {
            profile,
            chunks,
            json,
        } => commands::validate_chunks(config, &profile, &chunks, json),
        Command::CheckProfile { profile } => commands::check_profile(&profile),
    }
}

fn main() -> ExitCode {
    load_dotenv();
    let config = Config::from_env();

    // Logs go to stderr so stdout stays clean for reports.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    config.log_summary();

    match run(args, &config) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
