//! Cell value conversions

use chrono::NaiveDate;
use serde_json::{Value, json};

/// Parse `dd/mm/yyyy` or `yyyy-mm-dd` into Jira's `yyyy-mm-dd`
pub fn format_date(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// `"Parent -> Child"` becomes a cascading select with a child option
pub fn cascading_select(s: &str) -> Value {
    match s.split_once("->") {
        Some((parent, child)) => json!({
            "value": parent.trim(),
            "child": { "value": child.trim() }
        }),
        None => json!({ "value": s.trim() }),
    }
}

pub fn select(s: &str) -> Value {
    json!({ "value": s })
}

/// Comma separated options, blanks dropped
pub fn split_options(s: &str) -> Vec<Value> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(select)
        .collect()
}

pub fn original_estimate(hours: &str) -> Value {
    json!({ "originalEstimate": format!("{}h", hours.trim()) })
}
