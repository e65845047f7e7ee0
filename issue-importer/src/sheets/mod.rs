//! Spreadsheet storage
//!
//! The importer reads input sheets from one folder and writes result sheets
//! to others. `SheetStore` is the seam; `LocalSheetStore` keeps folders as
//! directories of `.xlsx` workbooks.

pub mod excel;
pub mod local;

pub use local::LocalSheetStore;

use anyhow::Result;
use async_trait::async_trait;

/// A spreadsheet inside a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRef {
    pub id: String,
    pub name: String,
}

/// An output cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Link { url: String, text: String },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn link(url: impl Into<String>, text: impl Into<String>) -> Self {
        Cell::Link {
            url: url.into(),
            text: text.into(),
        }
    }

    /// Visible text of the cell
    pub fn display(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Link { text, .. } => text,
        }
    }
}

/// Folder-based spreadsheet storage
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Resolve a folder by name
    async fn find_folder(&self, name: &str) -> Result<String>;

    /// Spreadsheets directly inside a folder
    async fn list_spreadsheets(&self, folder_id: &str) -> Result<Vec<SheetRef>>;

    /// All rows of the first worksheet, cells as strings
    async fn read_sheet(&self, sheet: &SheetRef) -> Result<Vec<Vec<String>>>;

    /// Create a new spreadsheet in `folder_id`, returning its id
    async fn create_spreadsheet(
        &self,
        title: &str,
        rows: &[Vec<Cell>],
        folder_id: &str,
    ) -> Result<String>;
}
