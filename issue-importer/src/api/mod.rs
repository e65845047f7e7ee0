//! Jira Cloud REST API module
//!
//! Payload models for the bulk create endpoint, an HTTP client that talks to
//! it, and the `IssueTracker` seam the import scheduler submits batches through.

pub mod client;
pub mod models;
pub mod tracker;

pub use client::JiraClient;
pub use tracker::{BatchEntry, DryRunTracker, IssueTracker};
