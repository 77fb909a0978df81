//! ColabFit materials database source.
//!
//! Talks to the MCP endpoints of the ColabFit service:
//!
//! - `POST {base}/dataset-query` with the filter set as JSON, answered with
//!   the full list of matching dataset records
//! - `GET {base}/dataset-download/{format}/{filename}`, answered with the
//!   archive bytes
//!
//! Both requests use HTTP basic authentication.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};
use url::Url;

use crate::config::{ApiConfig, Config};
use crate::models::{DatasetFilters, DatasetRecord, DownloadTarget};
use crate::sources::{DatasetSource, SourceError};
use crate::utils::HttpClient;

/// ColabFit HTTP source
#[derive(Debug, Clone)]
pub struct ColabFitSource {
    client: HttpClient,
    base_url: Url,
    api: ApiConfig,
    chunk_size: usize,
}

impl ColabFitSource {
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(&config.http)
            .map_err(|e| SourceError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(config, client)
    }

    /// Build the source around an already configured client
    pub fn with_client(config: &Config, client: HttpClient) -> Result<Self, SourceError> {
        let base_url = Url::parse(&config.api.base_url).map_err(|e| {
            SourceError::Config(format!("Invalid base URL '{}': {}", config.api.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::Config(format!(
                "Base URL '{}' cannot carry a path",
                config.api.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            api: config.api.clone(),
            chunk_size: config.downloads.chunk_size,
        })
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn error_for_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(SourceError::Status { status, url, body })
    }
}

#[async_trait]
impl DatasetSource for ColabFitSource {
    fn id(&self) -> &str {
        "colabfit"
    }

    async fn query(&self, filters: &DatasetFilters) -> Result<Vec<DatasetRecord>, SourceError> {
        let url = self.endpoint(&["dataset-query"]);
        tracing::debug!(%url, "Posting dataset query");

        let response = self
            .client
            .client()
            .post(url)
            .basic_auth(&self.api.username, Some(&self.api.password))
            .json(filters)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to query ColabFit: {}", e)))?;

        let response = Self::error_for_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to read query response: {}", e)))?;

        let records: Vec<DatasetRecord> = serde_json::from_str(&body)?;
        tracing::debug!(count = records.len(), "Dataset query returned");
        Ok(records)
    }

    async fn download(&self, target: &DownloadTarget) -> Result<u64, SourceError> {
        let url = self.endpoint(&[
            "dataset-download",
            target.format.as_str(),
            &target.remote_filename,
        ]);
        tracing::debug!(%url, path = %target.path.display(), "Downloading dataset");

        let response = self
            .client
            .client()
            .get(url)
            .basic_auth(&self.api.username, Some(&self.api.password))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to download dataset: {}", e)))?;

        let response = Self::error_for_status(response).await?;

        let file = tokio::fs::File::create(&target.path).await?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| SourceError::Network(format!("Download interrupted: {}", e)))?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        tracing::debug!(bytes = written, "Download complete");
        Ok(written)
    }
}
