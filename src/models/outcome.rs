//! Result envelopes returned to the tool caller.
//!
//! Both operations always produce one of these; failures are values, never
//! errors. Callers tell them apart by the `success` field.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::PathBuf;

use super::dataset::{DatasetRecord, Pagination};

/// One page of dataset query results
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub results: Vec<DatasetRecord>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl QueryPage {
    /// Cut `pagination`'s page out of the full remote result list
    pub fn from_full(records: Vec<DatasetRecord>, pagination: Pagination) -> Self {
        let total_pages = pagination.total_pages(records.len());
        Self {
            results: pagination.slice(records),
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages,
        }
    }

    pub fn result_length(&self) -> usize {
        self.results.len()
    }
}

/// Outcome of the dataset query operation
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Page(QueryPage),
    Failure(String),
}

impl QueryOutcome {
    pub fn failure(error: impl std::fmt::Display) -> Self {
        QueryOutcome::Failure(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Page(_))
    }
}

impl Serialize for QueryOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QueryOutcome::Page(page) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("results", &page.results)?;
                map.serialize_entry("result_length", &page.result_length())?;
                map.serialize_entry("page", &page.page)?;
                map.serialize_entry("page_size", &page.page_size)?;
                map.serialize_entry("total_pages", &page.total_pages)?;
                map.end()
            }
            QueryOutcome::Failure(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("results", error)?;
                map.end()
            }
        }
    }
}

/// Outcome of the dataset download operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: PathBuf, bytes: u64 },
    Failure(String),
}

impl DownloadOutcome {
    pub fn failure(error: impl std::fmt::Display) -> Self {
        DownloadOutcome::Failure(error.to_string())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Saved { .. })
    }
}

impl Serialize for DownloadOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DownloadOutcome::Saved { path, bytes } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("downloaded_file", &path.display().to_string())?;
                map.serialize_entry("bytes", bytes)?;
                map.end()
            }
            DownloadOutcome::Failure(error) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
