//! Import command handler

use anyhow::Result;
use colored::*;

use super::ImportCommands;
use crate::api::{DryRunTracker, IssueTracker, JiraClient};
use crate::cli::commands::report::print_folder_report;
use crate::config::Config;
use crate::import::{SheetImporter, WaveScheduler};
use crate::sheets::SheetStore;

/// Import every spreadsheet (or the one named by `--sheet`) into Jira
pub async fn handle_import_command<S>(
    args: ImportCommands,
    config: &Config,
    store: &S,
) -> Result<()>
where
    S: SheetStore + ?Sized,
{
    let dry_run_tracker;
    let client;
    let tracker: &dyn IssueTracker = if args.dry_run {
        println!(
            "{}",
            "Dry run: keys are simulated and no result sheets are written".yellow()
        );
        dry_run_tracker = DryRunTracker::new(config.jira.project_key.clone());
        &dry_run_tracker
    } else {
        let credentials = config.jira.credentials()?;
        client = JiraClient::new(&credentials)?;
        println!("Importing into {}", client.base_url().cyan());
        &client
    };

    let importer = SheetImporter::new(store, tracker, config.layout())
        .with_scheduler(WaveScheduler::new().with_max_batch_size(config.jira.batch_size))
        .with_folders(config.folders.clone())
        .with_output_names(config.output.clone())
        .with_browse_base(config.browse_base().map(str::to_string))
        .write_outputs(!args.dry_run);

    let report = importer.process_folder(args.sheet.as_deref()).await?;

    print_folder_report(&report, "created");

    if report.has_errors() {
        anyhow::bail!(
            "{} spreadsheet(s) could not be processed",
            report.errors.len()
        );
    }

    Ok(())
}
