//! Per-sheet import: read rows, map, schedule, write result sheets

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use log::{debug, error, info, trace, warn};

use super::mapping::{FieldLayout, MappingError, map_row};
use super::scheduler::{
    CreatedIssue, CreationRequest, FailedRequest, FailureReason, ScheduleOutcome, WaveScheduler,
};
use crate::api::IssueTracker;
use crate::config::{FolderNames, OutputNames};
use crate::sheets::{Cell, SheetRef, SheetStore};

/// Header written by the error sheet; stripped again when it is re-imported
pub const ERROR_COLUMN: &str = "_error";
/// First header cell of the success sheet
pub const KEY_COLUMN: &str = "ID_JIRA";

/// A data row and its position in the sheet (0 is the header)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub index: usize,
    pub cells: Vec<String>,
}

impl SourceRow {
    /// 1-based row number as shown by spreadsheet applications
    pub fn row_number(&self) -> usize {
        self.index + 1
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Header plus data rows of one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub header: Vec<String>,
    pub rows: Vec<SourceRow>,
}

/// Split raw rows into header and data rows
///
/// Returns `None` when there is no data row. A trailing `_error` header
/// column is removed from the header and every row.
pub fn split_sheet(mut rows: Vec<Vec<String>>) -> Option<SheetData> {
    if rows.len() < 2 {
        return None;
    }

    let mut header = rows.remove(0);
    let error_column = header
        .iter()
        .rposition(|h| h.trim() == ERROR_COLUMN)
        .filter(|&idx| header[idx + 1..].iter().all(|h| h.trim().is_empty()));
    if let Some(idx) = error_column {
        header.truncate(idx);
        for row in &mut rows {
            row.truncate(idx);
        }
    }

    let rows = rows
        .into_iter()
        .enumerate()
        .map(|(i, cells)| SourceRow {
            index: i + 1,
            cells,
        })
        .collect();

    Some(SheetData { header, rows })
}

/// Mapped rows ready for the scheduler, plus the rows that failed mapping
#[derive(Debug, Clone)]
pub struct PreparedRows {
    pub requests: Vec<CreationRequest<SourceRow>>,
    pub rejected: Vec<FailedRequest<SourceRow>>,
    pub blank: usize,
}

/// Map every non-blank row; failures and duplicate ids become rejections
pub fn prepare_requests(rows: Vec<SourceRow>, layout: &FieldLayout) -> PreparedRows {
    let mut requests = Vec::new();
    let mut rejected = Vec::new();
    let mut blank = 0;
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        if row.is_blank() {
            blank += 1;
            continue;
        }

        let mapped = map_row(&row.cells, layout).and_then(|mapped| {
            if seen.insert(mapped.local_id.clone()) {
                Ok(mapped)
            } else {
                Err(MappingError::DuplicateLocalId(mapped.local_id))
            }
        });

        match mapped {
            Ok(mapped) => {
                let mut request = CreationRequest::new(mapped.local_id, mapped.fields, row);
                if let Some(parent) = mapped.parent_local_id {
                    request = request.with_parent(parent);
                }
                requests.push(request);
            }
            Err(err) => {
                debug!("Row {} rejected: {}", row.row_number(), err);
                let local_id = row
                    .cells
                    .first()
                    .map(|c| c.trim().to_string())
                    .unwrap_or_default();
                rejected.push(FailedRequest {
                    local_id,
                    source_row: row,
                    reason: FailureReason::Validation(err.to_string()),
                });
            }
        }
    }

    PreparedRows {
        requests,
        rejected,
        blank,
    }
}

/// Mapping and scheduling failures, in sheet order
pub fn merge_failures(
    mut rejected: Vec<FailedRequest<SourceRow>>,
    scheduled: Vec<FailedRequest<SourceRow>>,
) -> Vec<FailedRequest<SourceRow>> {
    rejected.extend(scheduled);
    rejected.sort_by_key(|f| f.source_row.index);
    rejected
}

/// Success sheet: the issue key (as a link when a site is known) then the row
pub fn render_success_rows(
    header: &[String],
    created: &[CreatedIssue<SourceRow>],
    browse_base: Option<&str>,
) -> Vec<Vec<Cell>> {
    let mut rows = Vec::with_capacity(created.len() + 1);

    let mut header_row = vec![Cell::text(KEY_COLUMN)];
    header_row.extend(header.iter().map(Cell::text));
    rows.push(header_row);

    for issue in created {
        let key_cell = match browse_base {
            Some(base) => Cell::link(
                format!("{}/browse/{}", base.trim_end_matches('/'), issue.remote_key),
                issue.remote_key.clone(),
            ),
            None => Cell::text(issue.remote_key.clone()),
        };
        let mut row = vec![key_cell];
        row.extend(issue.source_row.cells.iter().map(Cell::text));
        rows.push(row);
    }

    rows
}

/// Error sheet: the row padded to the header width, then the reason
pub fn render_error_rows(
    header: &[String],
    failed: &[FailedRequest<SourceRow>],
) -> Vec<Vec<Cell>> {
    let width = header.len();
    let mut rows = Vec::with_capacity(failed.len() + 1);

    let mut header_row: Vec<Cell> = header.iter().map(Cell::text).collect();
    header_row.push(Cell::text(ERROR_COLUMN));
    rows.push(header_row);

    for failure in failed {
        let mut row: Vec<Cell> = failure.source_row.cells.iter().map(Cell::text).collect();
        row.resize(width, Cell::text(""));
        row.push(Cell::text(failure.reason.to_string()));
        rows.push(row);
    }

    rows
}

/// Short label used when counting failures
pub fn reason_label(reason: &FailureReason) -> &'static str {
    match reason {
        FailureReason::Validation(_) => "validation",
        FailureReason::Deadlock => "parent unresolved",
        FailureReason::BatchRejected(_) => "batch rejected",
        FailureReason::MissingFromResult => "not created",
        FailureReason::Aborted => "aborted",
    }
}

/// One failed row, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub row_number: usize,
    pub local_id: String,
    pub reason: String,
}

/// What happened to one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetReport {
    pub sheet: String,
    /// Fewer than two rows; nothing was done
    pub skipped: bool,
    pub created: usize,
    pub blank_rows: usize,
    pub waves: usize,
    pub failures: Vec<RowFailure>,
    pub failures_by_reason: BTreeMap<&'static str, usize>,
    /// Ids of the result sheets that were written
    pub outputs: Vec<String>,
}

impl SheetReport {
    fn skipped(sheet: &str) -> Self {
        Self {
            sheet: sheet.to_string(),
            skipped: true,
            ..Self::default()
        }
    }

    fn from_outcome(
        sheet: &str,
        blank_rows: usize,
        outcome: &ScheduleOutcome<SourceRow>,
        failed: &[FailedRequest<SourceRow>],
    ) -> Self {
        let mut failures_by_reason = BTreeMap::new();
        for failure in failed {
            *failures_by_reason.entry(reason_label(&failure.reason)).or_insert(0) += 1;
        }

        Self {
            sheet: sheet.to_string(),
            skipped: false,
            created: outcome.created.len(),
            blank_rows,
            waves: outcome.waves,
            failures: failed
                .iter()
                .map(|f| RowFailure {
                    row_number: f.source_row.row_number(),
                    local_id: f.local_id.clone(),
                    reason: f.reason.to_string(),
                })
                .collect(),
            failures_by_reason,
            outputs: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// A sheet that could not be processed at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: String,
}

/// Reports for every sheet in the import folder
#[derive(Debug, Clone, Default)]
pub struct FolderReport {
    pub sheets: Vec<SheetReport>,
    pub errors: Vec<SheetFailure>,
}

impl FolderReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn created(&self) -> usize {
        self.sheets.iter().map(|s| s.created).sum()
    }

    pub fn failed(&self) -> usize {
        self.sheets.iter().map(SheetReport::failed).sum()
    }
}

/// Resolved ids of the output folders
#[derive(Debug, Clone)]
struct OutputFolders {
    done: String,
    error: String,
}

/// Runs the import for the sheets of one folder
pub struct SheetImporter<'a, S: ?Sized, T: ?Sized> {
    store: &'a S,
    tracker: &'a T,
    layout: FieldLayout,
    scheduler: WaveScheduler,
    folders: FolderNames,
    output: OutputNames,
    browse_base: Option<String>,
    write_outputs: bool,
}

impl<'a, S, T> SheetImporter<'a, S, T>
where
    S: SheetStore + ?Sized,
    T: IssueTracker + ?Sized,
{
    pub fn new(store: &'a S, tracker: &'a T, layout: FieldLayout) -> Self {
        Self {
            store,
            tracker,
            layout,
            scheduler: WaveScheduler::new(),
            folders: FolderNames::default(),
            output: OutputNames::default(),
            browse_base: None,
            write_outputs: true,
        }
    }

    pub fn with_scheduler(mut self, scheduler: WaveScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_folders(mut self, folders: FolderNames) -> Self {
        self.folders = folders;
        self
    }

    pub fn with_output_names(mut self, output: OutputNames) -> Self {
        self.output = output;
        self
    }

    /// Site URL used for issue links in the success sheet
    pub fn with_browse_base(mut self, base: Option<String>) -> Self {
        self.browse_base = base;
        self
    }

    /// When disabled, no result sheets are written
    pub fn write_outputs(mut self, write: bool) -> Self {
        self.write_outputs = write;
        self
    }

    /// Process every sheet in the import folder, or only the one named `only`
    ///
    /// A sheet that fails is recorded in the report and the loop moves on.
    pub async fn process_folder(&self, only: Option<&str>) -> Result<FolderReport> {
        let import_folder = self
            .store
            .find_folder(&self.folders.import)
            .await
            .context("Failed to locate import folder")?;

        let targets = if self.write_outputs {
            Some(OutputFolders {
                done: self
                    .store
                    .find_folder(&self.folders.done)
                    .await
                    .context("Failed to locate done folder")?,
                error: self
                    .store
                    .find_folder(&self.folders.error)
                    .await
                    .context("Failed to locate error folder")?,
            })
        } else {
            None
        };

        let mut sheets = self
            .store
            .list_spreadsheets(&import_folder)
            .await
            .context("Failed to list spreadsheets")?;

        if let Some(name) = only {
            sheets.retain(|s| s.name == name);
            if sheets.is_empty() {
                anyhow::bail!("Spreadsheet '{}' not found in '{}'", name, self.folders.import);
            }
        }

        if sheets.is_empty() {
            info!("No spreadsheets found in '{}'", self.folders.import);
        }

        let mut report = FolderReport::default();
        for sheet in &sheets {
            match self.process_sheet(sheet, targets.as_ref()).await {
                Ok(sheet_report) => report.sheets.push(sheet_report),
                Err(err) => {
                    error!("Failed to process '{}': {:#}", sheet.name, err);
                    report.errors.push(SheetFailure {
                        sheet: sheet.name.clone(),
                        error: format!("{err:#}"),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Import one sheet; result sheets are written only when `targets` is set
    async fn process_sheet(
        &self,
        sheet: &SheetRef,
        targets: Option<&OutputFolders>,
    ) -> Result<SheetReport> {
        info!("Processing '{}'", sheet.name);

        let rows = self
            .store
            .read_sheet(sheet)
            .await
            .with_context(|| format!("Failed to read spreadsheet '{}'", sheet.name))?;

        let Some(data) = split_sheet(rows) else {
            warn!("'{}' has no data rows, skipping", sheet.name);
            return Ok(SheetReport::skipped(&sheet.name));
        };

        let prepared = prepare_requests(data.rows, &self.layout);
        let blank = prepared.blank;
        if !prepared.rejected.is_empty() {
            warn!(
                "'{}': {} row(s) failed validation",
                sheet.name,
                prepared.rejected.len()
            );
        }

        let mut outcome = self
            .scheduler
            .run(prepared.requests, self.tracker)
            .await
            .with_context(|| format!("Scheduling failed for '{}'", sheet.name))?;

        for issue in &outcome.created {
            debug!(
                "'{}': {} created as {} in wave {}",
                sheet.name,
                issue.local_id,
                issue.remote_key,
                issue.wave
            );
        }

        trace!("'{}': resolved {:?}", sheet.name, outcome.resolved());

        let failed = merge_failures(prepared.rejected, std::mem::take(&mut outcome.failed));
        let mut report = SheetReport::from_outcome(&sheet.name, blank, &outcome, &failed);

        if let Some(targets) = targets {
            if !outcome.created.is_empty() {
                let rows = render_success_rows(
                    &data.header,
                    &outcome.created,
                    self.browse_base.as_deref(),
                );
                let title = format!("{}{}", sheet.name, self.output.done_suffix);
                let id = self
                    .store
                    .create_spreadsheet(&title, &rows, &targets.done)
                    .await
                    .with_context(|| format!("Failed to write '{}'", title))?;
                report.outputs.push(id);
            }

            if !failed.is_empty() {
                let rows = render_error_rows(&data.header, &failed);
                let title = format!("{}{}", sheet.name, self.output.error_suffix);
                let id = self
                    .store
                    .create_spreadsheet(&title, &rows, &targets.error)
                    .await
                    .with_context(|| format!("Failed to write '{}'", title))?;
                report.outputs.push(id);
            }
        }

        info!(
            "'{}': {} created, {} failed in {} wave(s)",
            sheet.name,
            report.created,
            report.failed(),
            report.waves
        );

        Ok(report)
    }
}
