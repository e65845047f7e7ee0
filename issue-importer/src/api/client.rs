//! HTTP client for the Jira Cloud REST API

use anyhow::{Context, Result};
use reqwest::Client;

use super::models::{BulkCreateRequest, BulkCreateResponse, IssueUpdate};
use crate::config::JiraCredentials;

/// Basic-auth client for one Jira site
pub struct JiraClient {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Creates a new client from resolved credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(credentials: &JiraCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(credentials.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            email: credentials.email.clone(),
            api_token: credentials.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bulk-creates issues.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Jira answers with a non-2xx
    /// status, or the response cannot be parsed.
    pub async fn bulk_create(&self, issue_updates: Vec<IssueUpdate>) -> Result<BulkCreateResponse> {
        let url = format!("{}/rest/api/3/issue/bulk", self.base_url);
        let request = BulkCreateRequest { issue_updates };

        log::debug!(
            "POST {} with {} issue(s): {}",
            url,
            request.issue_updates.len(),
            serde_json::to_string(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request")?;

        if response.status().is_success() {
            response.json().await.context("Failed to parse response")
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({status}): {body}")
        }
    }
}
