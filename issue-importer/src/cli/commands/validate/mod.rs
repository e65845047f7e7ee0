//! `validate` command

mod handler;

pub use handler::handle_validate_command;

use clap::Args;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ValidateCommands {
    /// Only validate the spreadsheet with this name
    #[arg(long)]
    pub sheet: Option<String>,
}
