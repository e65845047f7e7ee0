//! Spreadsheet to Jira import
//!
//! `mapping` turns rows into field payloads, `scheduler` creates them parent
//! first, and `pipeline` ties both to the sheet store.

pub mod mapping;
pub mod pipeline;
pub mod scheduler;

pub use pipeline::{FolderReport, SheetImporter, SheetReport};
pub use scheduler::WaveScheduler;
