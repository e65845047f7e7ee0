//! Terminal rendering of import reports

use colored::*;

use crate::import::{FolderReport, SheetReport};

/// Print one block per sheet, then a totals line
pub fn print_folder_report(report: &FolderReport, verb: &str) {
    for sheet in &report.sheets {
        print_sheet_report(sheet, verb);
    }

    for failure in &report.errors {
        println!("{} {}", failure.sheet.bold(), "failed".red().bold());
        println!("  {}", failure.error.red());
    }

    if report.sheets.is_empty() && report.errors.is_empty() {
        println!("{}", "No spreadsheets to process".yellow());
        return;
    }

    println!();
    let failed = report.failed();
    println!(
        "{} {} {}, {} row(s) failed, {} sheet error(s)",
        "Total:".bold(),
        report.created().to_string().green().bold(),
        verb,
        if failed > 0 {
            failed.to_string().red().bold()
        } else {
            failed.to_string().normal()
        },
        if report.has_errors() {
            report.errors.len().to_string().red().bold()
        } else {
            report.errors.len().to_string().normal()
        },
    );
}

fn print_sheet_report(sheet: &SheetReport, verb: &str) {
    if sheet.skipped {
        println!("{} {}", sheet.sheet.bold(), "(no data rows, skipped)".dimmed());
        return;
    }

    let status = if sheet.failures.is_empty() {
        "ok".green().bold()
    } else {
        "with errors".yellow().bold()
    };
    println!("{} {}", sheet.sheet.bold(), status);
    println!(
        "  {} {}, {} failed, {} wave(s)",
        sheet.created.to_string().green(),
        verb,
        sheet.failed(),
        sheet.waves
    );
    if sheet.blank_rows > 0 {
        println!("  {}", format!("{} blank row(s) skipped", sheet.blank_rows).dimmed());
    }

    for (reason, count) in &sheet.failures_by_reason {
        println!("  {}: {}", reason.yellow(), count);
    }

    for failure in &sheet.failures {
        let id = if failure.local_id.is_empty() {
            "-".to_string()
        } else {
            failure.local_id.clone()
        };
        println!(
            "    row {:>4}  {:<12} {}",
            failure.row_number,
            id.cyan(),
            failure.reason.dimmed()
        );
    }

    for output in &sheet.outputs {
        println!("  {} {}", "wrote".dimmed(), output);
    }
}
