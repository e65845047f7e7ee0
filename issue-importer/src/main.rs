//! issue-importer - create Jira issues from spreadsheets
//!
//! Reads every spreadsheet in the import folder, creates one issue per row
//! (parents before children), and writes a done sheet with links to the new
//! issues and an error sheet with the rows that failed.

mod api;
mod cli;
mod config;
mod import;
mod sheets;

use anyhow::{Context, Result};
use clap::Parser;

use cli::commands::import::handle_import_command;
use cli::commands::validate::handle_validate_command;
use cli::{Cli, Commands};
use config::Config;
use sheets::LocalSheetStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials and RUST_LOG may come from .env
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        return Err(err).context("Failed to load .env file");
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    log::debug!("Resolved config: {:?}", redacted(&config));

    if !cli.root.is_dir() {
        anyhow::bail!("Root directory does not exist: {}", cli.root.display());
    }
    let store = LocalSheetStore::new(&cli.root);

    match cli.command {
        Commands::Import(args) => handle_import_command(args, &config, &store).await,
        Commands::Validate(args) => handle_validate_command(args, &config, &store).await,
    }
}

/// Config with the API token blanked out, for logging
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.jira.api_token.is_some() {
        config.jira.api_token = Some("***".to_string());
    }
    config
}
