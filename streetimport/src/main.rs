// streetimport/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug streetimport import ... to see every record
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dump = cli.dump.as_deref();

    let success = match cli.command {
        // --- USE CASE: IMPORT ONE FILE ---
        Commands::Import { file } => commands::import::execute(&cli.config_dir, file, dump).await?,

        // --- USE CASE: IMPORT A FOLDER ---
        Commands::ImportFolder { dir } => {
            commands::import_folder::execute(&cli.config_dir, dir, dump).await?
        }

        // --- USE CASE: SETTINGS ---
        Commands::Settings { action } => {
            commands::settings::execute(&cli.config_dir, action)?;
            true
        }

        // --- USE CASE: DOMAINS ---
        Commands::Domains => {
            commands::domains::execute(&cli.config_dir)?;
            true
        }
    };

    if !success {
        // Exit with error code for CI/CD
        std::process::exit(1);
    }
    Ok(())
}
