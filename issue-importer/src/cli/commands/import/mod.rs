//! `import` command

mod handler;

pub use handler::handle_import_command;

use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ImportCommands {
    /// Assign fake keys instead of calling Jira; no result sheets are written
    #[arg(long)]
    pub dry_run: bool,

    /// Only import the spreadsheet with this name
    #[arg(long)]
    pub sheet: Option<String>,
}
