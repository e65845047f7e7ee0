//! Configuration loading
//!
//! Values are resolved from built-in defaults, then an optional TOML file,
//! then environment variables (which `main` seeds from `.env`).

mod file;

pub use file::FileConfig;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::import::mapping::{FieldLayout, IssueType};

const APP_DIR: &str = "issue-importer";
const CONFIG_FILE: &str = "config.toml";

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub jira: JiraSettings,
    pub folders: FolderNames,
    pub output: OutputNames,
    pub issue_types: Vec<IssueType>,
    pub epic_type_id: String,
}

#[derive(Debug, Clone)]
pub struct JiraSettings {
    pub url: Option<String>,
    pub email: Option<String>,
    pub api_token: Option<String>,
    pub project_id: String,
    pub project_key: String,
    /// Maximum issues per bulk create call
    pub batch_size: usize,
    pub timeout: Duration,
}

/// Credentials needed to talk to a live Jira site
#[derive(Debug, Clone)]
pub struct JiraCredentials {
    pub url: String,
    pub email: String,
    pub api_token: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNames {
    pub import: String,
    pub done: String,
    pub error: String,
}

/// Suffixes appended to the input sheet name for result sheets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub done_suffix: String,
    pub error_suffix: String,
}

impl Default for JiraSettings {
    fn default() -> Self {
        Self {
            url: None,
            email: None,
            api_token: None,
            project_id: "10879".to_string(),
            project_key: "DRY".to_string(),
            batch_size: 50,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for FolderNames {
    fn default() -> Self {
        Self {
            import: "JiraCard - Importar".to_string(),
            done: "JiraCard - Concluído".to_string(),
            error: "JiraCard - Erro".to_string(),
        }
    }
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            done_suffix: " - Concluído".to_string(),
            error_suffix: " - Erro".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let layout = FieldLayout::default();
        Self {
            jira: JiraSettings::default(),
            folders: FolderNames::default(),
            output: OutputNames::default(),
            issue_types: layout.issue_types,
            epic_type_id: layout.epic_type_id,
        }
    }
}

impl Config {
    /// Load configuration from `path` (must exist) or the default location
    /// (optional), then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();
        file.apply(&mut config);

        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = env("JIRA_URL") {
            config.jira.url = Some(url);
        }
        if let Some(email) = env("JIRA_EMAIL") {
            config.jira.email = Some(email);
        }
        if let Some(token) = env("JIRA_API_TOKEN") {
            config.jira.api_token = Some(token);
        }
        if let Some(project_id) = env("JIRA_PROJECT_ID") {
            config.jira.project_id = project_id;
        }
        if let Some(project_key) = env("JIRA_PROJECT_KEY") {
            config.jira.project_key = project_key;
        }
        if let Some(batch_size) = env("JIRA_BATCH_SIZE") {
            config.jira.batch_size = batch_size.parse().with_context(|| {
                format!("JIRA_BATCH_SIZE must be a number, got '{}'", batch_size)
            })?;
        }
        if let Some(timeout) = env("JIRA_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().with_context(|| {
                format!("JIRA_TIMEOUT_SECS must be a number, got '{}'", timeout)
            })?;
            config.jira.timeout = Duration::from_secs(secs);
        }
        if let Some(folder) = env("JIRA_FOLDER_NAME") {
            config.folders.import = folder;
        }
        if let Some(folder) = env("JIRA_DONE_FOLDER_NAME") {
            config.folders.done = folder;
        }
        if let Some(folder) = env("JIRA_ERROR_FOLDER_NAME") {
            config.folders.error = folder;
        }

        Ok(config)
    }

    /// Field layout for the row mapper
    pub fn layout(&self) -> FieldLayout {
        FieldLayout {
            issue_types: self.issue_types.clone(),
            epic_type_id: self.epic_type_id.clone(),
            ..FieldLayout::new(self.jira.project_id.clone())
        }
    }

    /// Base URL for issue links, if a site is configured
    pub fn browse_base(&self) -> Option<&str> {
        self.jira.url.as_deref().map(|u| u.trim_end_matches('/'))
    }
}

impl JiraSettings {
    /// Credentials for a live import; every piece must be configured
    pub fn credentials(&self) -> Result<JiraCredentials> {
        let url = self
            .url
            .clone()
            .context("JIRA_URL is not set (environment, .env or config file)")?;
        let email = self
            .email
            .clone()
            .context("JIRA_EMAIL is not set (environment, .env or config file)")?;
        let api_token = self
            .api_token
            .clone()
            .context("JIRA_API_TOKEN is not set (environment, .env or config file)")?;

        Ok(JiraCredentials {
            url,
            email,
            api_token,
            timeout: self.timeout,
        })
    }
}

/// `<config dir>/issue-importer/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

pub(crate) fn issue_types_from_table(table: &BTreeMap<String, String>) -> Vec<IssueType> {
    table
        .iter()
        .map(|(name, id)| IssueType::new(name.clone(), id.clone()))
        .collect()
}
