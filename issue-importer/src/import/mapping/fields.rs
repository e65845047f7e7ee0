//! Build the Jira field payload for one row

use serde_json::{Map, Value, json};

use super::layout::{COLUMNS, ColumnKind, FieldLayout};
use super::values::{cascading_select, format_date, original_estimate, select, split_options};
use super::{MappedRow, MappingError};

/// Map a spreadsheet row to Jira fields
///
/// Empty cells are skipped and columns past the layout are ignored. The
/// parent is returned as a local id; the scheduler injects the real key.
pub fn map_row(row: &[String], layout: &FieldLayout) -> Result<MappedRow, MappingError> {
    let cells: Vec<(ColumnKind, &str)> = COLUMNS
        .iter()
        .zip(row)
        .filter_map(|(kind, raw)| {
            let value = raw.trim();
            (!value.is_empty()).then_some((*kind, value))
        })
        .collect();

    let mut local_id = None;
    let mut parent_local_id = None;
    let mut issue_type_id = None;

    for &(kind, value) in &cells {
        match kind {
            ColumnKind::LocalId => local_id = Some(value.to_string()),
            ColumnKind::ParentId => parent_local_id = Some(value.to_string()),
            ColumnKind::IssueType => {
                let id = layout.issue_type_id(value).ok_or_else(|| {
                    MappingError::UnknownIssueType {
                        value: value.to_string(),
                        accepted: layout.issue_type_names(),
                    }
                })?;
                issue_type_id = Some(id.to_string());
            }
            _ => {}
        }
    }

    let issue_type_id = issue_type_id.ok_or(MappingError::MissingIssueType)?;
    let local_id = local_id.ok_or(MappingError::MissingLocalId)?;
    let is_epic = layout.is_epic(&issue_type_id);

    let mut fields = Map::new();
    fields.insert("project".to_string(), json!({ "id": layout.project_id }));
    fields.insert("issuetype".to_string(), json!({ "id": issue_type_id }));

    for (kind, value) in cells {
        match kind {
            ColumnKind::LocalId | ColumnKind::ParentId | ColumnKind::IssueType => {}
            ColumnKind::Text(field) => {
                fields.insert(field.to_string(), json!(value));
            }
            ColumnKind::Date(field) => {
                let date = format_date(value).map(Value::String).unwrap_or(Value::Null);
                fields.insert(field.to_string(), date);
            }
            ColumnKind::Estimate => {
                fields.insert("timetracking".to_string(), original_estimate(value));
            }
            ColumnKind::Select(field) => {
                fields.insert(field.to_string(), select(value));
            }
            ColumnKind::CascadingSelect(field) => {
                fields.insert(field.to_string(), cascading_select(value));
            }
            ColumnKind::Integer(field) => {
                if let Ok(n) = value.parse::<i64>() {
                    fields.insert(field.to_string(), json!(n));
                }
            }
            ColumnKind::MultiSelectList(field) if !is_epic => {
                for option in split_options(value) {
                    push_value(&mut fields, field, option);
                }
            }
            ColumnKind::MultiSelectItem(field) if !is_epic => {
                push_value(&mut fields, field, select(value));
            }
            ColumnKind::MultiSelectList(_) | ColumnKind::MultiSelectItem(_) => {}
            ColumnKind::Label => push_value(&mut fields, "labels", json!(value)),
        }
    }

    Ok(MappedRow {
        local_id,
        parent_local_id,
        fields,
    })
}

fn push_value(fields: &mut Map<String, Value>, field: &str, value: Value) {
    let entry = fields
        .entry(field.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        items.push(value);
    }
}
