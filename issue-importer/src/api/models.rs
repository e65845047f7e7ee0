//! Wire types for `POST /rest/api/3/issue/bulk`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Request body for the bulk create endpoint
#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateRequest {
    #[serde(rename = "issueUpdates")]
    pub issue_updates: Vec<IssueUpdate>,
}

/// One issue to create
#[derive(Debug, Clone, Serialize)]
pub struct IssueUpdate {
    /// Field payload keyed by Jira field id (e.g. "summary", "customfield_10015")
    pub fields: Map<String, Value>,
}

/// Response body of the bulk create endpoint
///
/// Jira answers 201 even when only some elements were created; the failed
/// elements are listed in `errors` by their position in the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkCreateResponse {
    #[serde(default)]
    pub issues: Vec<CreatedIssueRef>,
    #[serde(default)]
    pub errors: Vec<BulkOperationError>,
}

/// An issue Jira created
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedIssueRef {
    #[serde(default)]
    pub id: String,
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: String,
}

/// Failure report for a single element of the request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationError {
    #[serde(default)]
    pub status: Option<u16>,
    /// Zero-based position of the failed element in `issueUpdates`
    pub failed_element_number: usize,
    #[serde(default)]
    pub element_errors: ErrorCollection,
}

/// Jira's standard error collection
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCollection {
    #[serde(default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

impl BulkCreateResponse {
    /// Positions of request elements Jira reported as failed
    pub fn failed_elements(&self) -> HashSet<usize> {
        self.errors.iter().map(|e| e.failed_element_number).collect()
    }
}

impl ErrorCollection {
    /// Flatten into a single human readable line
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self.error_messages.clone();
        let mut field_errors: Vec<_> = self.errors.iter().collect();
        field_errors.sort();
        parts.extend(field_errors.into_iter().map(|(field, msg)| format!("{field}: {msg}")));
        parts.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_issue_updates() {
        let mut fields = Map::new();
        fields.insert("summary".to_string(), json!("Write docs"));
        let request = BulkCreateRequest {
            issue_updates: vec![IssueUpdate { fields }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"issueUpdates": [{"fields": {"summary": "Write docs"}}]}));
    }

    #[test]
    fn test_parse_partial_response() {
        let body = json!({
            "issues": [
                {"id": "10001", "key": "PRJ-1", "self": "https://example.atlassian.net/rest/api/3/issue/10001"}
            ],
            "errors": [
                {
                    "status": 400,
                    "failedElementNumber": 1,
                    "elementErrors": {
                        "errorMessages": [],
                        "errors": {"summary": "You must specify a summary of the issue."}
                    }
                }
            ]
        });

        let response: BulkCreateResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.issues.len(), 1);
        assert_eq!(response.issues[0].key, "PRJ-1");
        assert_eq!(response.failed_elements(), HashSet::from([1]));
        assert_eq!(
            response.errors[0].element_errors.summary(),
            "summary: You must specify a summary of the issue."
        );
    }

    #[test]
    fn test_parse_response_without_errors() {
        let response: BulkCreateResponse =
            serde_json::from_value(json!({"issues": [{"id": "1", "key": "PRJ-9"}]})).unwrap();
        assert!(response.errors.is_empty());
        assert!(response.issues[0].self_url.is_empty());
    }
}
