//! Validate command handler

use anyhow::Result;
use colored::*;

use super::ValidateCommands;
use crate::api::DryRunTracker;
use crate::cli::commands::report::print_folder_report;
use crate::config::Config;
use crate::import::SheetImporter;
use crate::sheets::SheetStore;

/// Map every row and run the scheduler against simulated keys
///
/// Reports rows that fail mapping and rows whose parents can never be
/// created. Nothing is written.
pub async fn handle_validate_command<S>(
    args: ValidateCommands,
    config: &Config,
    store: &S,
) -> Result<()>
where
    S: SheetStore + ?Sized,
{
    let tracker = DryRunTracker::new(config.jira.project_key.clone());

    let importer = SheetImporter::new(store, &tracker, config.layout())
        .with_folders(config.folders.clone())
        .write_outputs(false);

    let report = importer.process_folder(args.sheet.as_deref()).await?;

    print_folder_report(&report, "valid");

    let problems = report.failed() + report.errors.len();
    if problems > 0 {
        anyhow::bail!("Validation found {} problem(s)", problems);
    }

    println!("{}", "All rows are valid".green().bold());
    Ok(())
}
