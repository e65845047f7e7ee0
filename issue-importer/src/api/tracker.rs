//! Batch-create seam between the import scheduler and the issue tracker

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

use super::client::JiraClient;
use super::models::{BulkCreateResponse, IssueUpdate};

/// Mapping from local id to the key the tracker assigned
pub type CreatedKeys = HashMap<String, String>;

/// One element of a submitted batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    pub local_id: String,
    pub fields: Map<String, Value>,
}

/// The whole batch call failed; nothing in it may be assumed created
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{0}")]
    Request(String),
    #[error("malformed bulk create response: {0}")]
    Malformed(String),
}

/// Something that can create a batch of issues in one call
///
/// Implementations return the keys of the elements that were created.
/// Elements missing from the map are treated as individually failed.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn create_batch(&self, batch: &[BatchEntry]) -> Result<CreatedKeys, BatchError>;
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn create_batch(&self, batch: &[BatchEntry]) -> Result<CreatedKeys, BatchError> {
        let updates = batch
            .iter()
            .map(|entry| IssueUpdate {
                fields: entry.fields.clone(),
            })
            .collect();

        let response = self
            .bulk_create(updates)
            .await
            .map_err(|e| BatchError::Request(format!("{e:#}")))?;

        for error in &response.errors {
            let local_id = batch
                .get(error.failed_element_number)
                .map(|e| e.local_id.as_str())
                .unwrap_or("?");
            let status = error
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            log::warn!(
                "Jira rejected row {} ({}): {}",
                local_id,
                status,
                error.element_errors.summary()
            );
        }

        for issue in &response.issues {
            log::debug!("Created {} (id {}, {})", issue.key, issue.id, issue.self_url);
        }

        match_created_keys(batch, &response)
    }
}

/// Pair created issues with the local ids that requested them
///
/// Jira lists created issues in request order, skipping the elements it
/// reported in `errors`.
pub fn match_created_keys(
    batch: &[BatchEntry],
    response: &BulkCreateResponse,
) -> Result<CreatedKeys, BatchError> {
    let failed = response.failed_elements();
    if let Some(out_of_range) = failed.iter().find(|&&n| n >= batch.len()) {
        return Err(BatchError::Malformed(format!(
            "failed element {} but only {} were submitted",
            out_of_range,
            batch.len()
        )));
    }

    let accepted: Vec<&BatchEntry> = batch
        .iter()
        .enumerate()
        .filter(|(idx, _)| !failed.contains(idx))
        .map(|(_, entry)| entry)
        .collect();

    if response.issues.len() > accepted.len() {
        return Err(BatchError::Malformed(format!(
            "{} issues created for {} accepted elements",
            response.issues.len(),
            accepted.len()
        )));
    }

    Ok(accepted
        .into_iter()
        .zip(&response.issues)
        .map(|(entry, issue)| (entry.local_id.clone(), issue.key.clone()))
        .collect())
}

/// Tracker that pretends to create issues, assigning sequential keys
pub struct DryRunTracker {
    project_key: String,
    next: AtomicUsize,
}

impl DryRunTracker {
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            next: AtomicUsize::new(1),
        }
    }
}

#[async_trait]
impl IssueTracker for DryRunTracker {
    async fn create_batch(&self, batch: &[BatchEntry]) -> Result<CreatedKeys, BatchError> {
        let mut keys = CreatedKeys::new();
        for entry in batch {
            let n = self.next.fetch_add(1, Ordering::Relaxed);
            let key = format!("{}-{}", self.project_key, n);
            log::info!(
                "[dry-run] would create {} as {} ({})",
                entry.local_id,
                key,
                entry
                    .fields
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or("<no summary>")
            );
            keys.insert(entry.local_id.clone(), key);
        }
        Ok(keys)
    }
}
