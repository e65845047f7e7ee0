//! Spreadsheet row to Jira field payload mapping

mod fields;
mod layout;
mod values;

pub use fields::map_row;
pub use layout::{FieldLayout, IssueType};

use serde_json::{Map, Value};
use thiserror::Error;

/// A row that is ready to be scheduled
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub local_id: String,
    pub parent_local_id: Option<String>,
    pub fields: Map<String, Value>,
}

/// Why a row could not be mapped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("issue type '{value}' is not recognized; use one of: {}", .accepted.join(", "))]
    UnknownIssueType { value: String, accepted: Vec<String> },
    #[error("issue type (column C) is empty")]
    MissingIssueType,
    #[error("row has no id (column A)")]
    MissingLocalId,
    #[error("id '{0}' is used by an earlier row")]
    DuplicateLocalId(String),
}
