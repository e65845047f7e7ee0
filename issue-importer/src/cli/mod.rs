//! Command line interface

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::import::ImportCommands;
use commands::validate::ValidateCommands;

#[derive(Parser)]
#[command(name = "issue-importer")]
#[command(about = "Create Jira issues from spreadsheets, parents before children")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the import, done and error folders
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import every spreadsheet in the import folder
    Import(ImportCommands),
    /// Check spreadsheets for row and parent problems without creating issues
    Validate(ValidateCommands),
}
