//! HabitMate application binary - composition root.
//!
//! 1. Parse CLI arguments
//! 2. Load configuration from TOML
//! 3. Open the habit and account databases in the data directory
//! 4. Run one command on behalf of the logged-in user

mod cli;
mod commands;
mod session;

use std::process::ExitCode;

use clap::Parser;

use habitmate_core::config::HabitMateConfig;

use crate::cli::CliArgs;
use crate::commands::App;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Config is read before tracing so its log level can apply.
    let config_file = args.resolve_config_path();
    let loaded = if config_file.exists() {
        Some(HabitMateConfig::load(&config_file))
    } else {
        None
    };
    let config = match &loaded {
        Some(Ok(config)) => config.clone(),
        _ => HabitMateConfig::default(),
    };

    // Tracing.
    let level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match loaded {
        Some(Ok(_)) => tracing::debug!(path = %config_file.display(), "Configuration loaded"),
        Some(Err(e)) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
        None => tracing::debug!(path = %config_file.display(), "No config file, using defaults"),
    }

    let data_dir = args.resolve_data_dir(&config);
    tracing::debug!(data_dir = %data_dir.display(), "Opening stores");

    let app = match App::open(config, &data_dir) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match app
        .execute(args.command)
        .and_then(|output| output.render(args.json))
    {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
