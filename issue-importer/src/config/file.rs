//! TOML config file layer

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{Config, issue_types_from_table};

/// Everything the config file may set; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub jira: JiraSection,
    pub folders: FoldersSection,
    pub output: OutputSection,
    /// Issue type name to Jira id; replaces the built-in table when non-empty
    pub issue_types: BTreeMap<String, String>,
    pub epic_type_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraSection {
    pub url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub project_id: Option<String>,
    pub project_key: Option<String>,
    pub batch_size: Option<usize>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoldersSection {
    pub import: Option<String>,
    pub done: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub done_suffix: Option<String>,
    pub error_suffix: Option<String>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay the values present in the file onto `config`
    pub(super) fn apply(self, config: &mut Config) {
        let jira = self.jira;
        if jira.url.is_some() {
            config.jira.url = jira.url;
        }
        if jira.email.is_some() {
            config.jira.email = jira.email;
        }
        if jira.api_token.is_some() {
            config.jira.api_token = jira.api_token;
        }
        if let Some(project_id) = jira.project_id {
            config.jira.project_id = project_id;
        }
        if let Some(project_key) = jira.project_key {
            config.jira.project_key = project_key;
        }
        if let Some(batch_size) = jira.batch_size {
            config.jira.batch_size = batch_size;
        }
        if let Some(secs) = jira.timeout_secs {
            config.jira.timeout = Duration::from_secs(secs);
        }

        if let Some(import) = self.folders.import {
            config.folders.import = import;
        }
        if let Some(done) = self.folders.done {
            config.folders.done = done;
        }
        if let Some(error) = self.folders.error {
            config.folders.error = error;
        }

        if let Some(suffix) = self.output.done_suffix {
            config.output.done_suffix = suffix;
        }
        if let Some(suffix) = self.output.error_suffix {
            config.output.error_suffix = suffix;
        }

        if !self.issue_types.is_empty() {
            config.issue_types = issue_types_from_table(&self.issue_types);
        }
        if let Some(epic) = self.epic_type_id {
            config.epic_type_id = epic;
        }
    }
}
