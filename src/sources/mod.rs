//! Dataset sources.
//!
//! The [`DatasetSource`] trait is the seam between the tool operations and
//! the remote service. [`ColabFitSource`] talks to the ColabFit HTTP API;
//! [`MockSource`] serves canned data for tests.

mod colabfit;
pub mod mock;

pub use colabfit::ColabFitSource;
pub use mock::MockSource;

use crate::models::{DatasetFilters, DatasetRecord, DownloadTarget};
use async_trait::async_trait;

/// A remote service that can search and serve dataset archives
#[async_trait]
pub trait DatasetSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Run a dataset query and return the full, unpaginated result list
    async fn query(&self, filters: &DatasetFilters) -> Result<Vec<DatasetRecord>, SourceError>;

    /// Fetch the archive described by `target` and write it to `target.path`,
    /// returning the number of bytes written.
    ///
    /// Any existing file at the destination is truncated. Nothing is written
    /// when the remote service answers with an error status.
    async fn download(&self, target: &DownloadTarget) -> Result<u64, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Source misconfiguration, e.g. an unusable base URL
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}
