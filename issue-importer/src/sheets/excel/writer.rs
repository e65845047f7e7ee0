//! Write rows of cells to a new xlsx file

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use crate::sheets::Cell;

/// Write `rows` to the first worksheet of a new workbook at `path`
pub fn write_workbook(path: &Path, rows: &[Vec<Cell>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = col_idx as u16;
            if cell.display().is_empty() {
                continue;
            }
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(row_num, col, s)?;
                }
                Cell::Link { url, text } => {
                    worksheet.write_url_with_text(row_num, col, url.as_str(), text)?;
                }
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}
