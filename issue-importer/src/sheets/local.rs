//! Sheet store backed by a local directory tree
//!
//! Each folder is a sub-directory of the root and each spreadsheet is an
//! `.xlsx` file inside it, named after the spreadsheet.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use super::excel::{read_workbook_rows, write_workbook};
use super::{Cell, SheetRef, SheetStore};

const EXTENSION: &str = "xlsx";

#[derive(Debug, Clone)]
pub struct LocalSheetStore {
    root: PathBuf,
}

impl LocalSheetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SheetStore for LocalSheetStore {
    async fn find_folder(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        if !path.is_dir() {
            anyhow::bail!("Folder '{}' not found in {}", name, self.root.display());
        }
        Ok(path.to_string_lossy().into_owned())
    }

    async fn list_spreadsheets(&self, folder_id: &str) -> Result<Vec<SheetRef>> {
        let entries = std::fs::read_dir(folder_id)
            .with_context(|| format!("Failed to list folder: {}", folder_id))?;

        let mut sheets = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("Failed to list folder: {}", folder_id))?
                .path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Lock files Excel leaves next to open workbooks
            if name.starts_with("~$") {
                continue;
            }
            sheets.push(SheetRef {
                id: path.to_string_lossy().into_owned(),
                name: name.to_string(),
            });
        }

        sheets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sheets)
    }

    async fn read_sheet(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>> {
        read_workbook_rows(Path::new(&sheet.id))
    }

    async fn create_spreadsheet(
        &self,
        title: &str,
        rows: &[Vec<Cell>],
        folder_id: &str,
    ) -> Result<String> {
        let path = unique_path(Path::new(folder_id), &sanitize_title(title));
        write_workbook(&path, rows)?;
        log::info!("Wrote {} row(s) to {}", rows.len(), path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}

/// File names may not contain path separators
fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect()
}

/// `{title}.xlsx`, or `{title} (n).xlsx` if taken
fn unique_path(folder: &Path, title: &str) -> PathBuf {
    let mut candidate = folder.join(format!("{title}.{EXTENSION}"));
    let mut n = 2;
    while candidate.exists() {
        candidate = folder.join(format!("{title} ({n}).{EXTENSION}"));
        n += 1;
    }
    candidate
}
