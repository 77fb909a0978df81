//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{DatasetFilters, DatasetRecord, DownloadTarget};
use crate::sources::{DatasetSource, SourceError};

#[derive(Debug, Default)]
struct MockState {
    records: Vec<DatasetRecord>,
    payload: Vec<u8>,
    failure: Option<String>,
    calls: usize,
    last_filters: Option<DatasetFilters>,
    last_target: Option<DownloadTarget>,
}

/// A mock source that serves predefined records and archive bytes.
#[derive(Debug, Default)]
pub struct MockSource {
    state: Mutex<MockState>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source answering queries with `records`.
    pub fn with_records(records: Vec<DatasetRecord>) -> Self {
        let source = Self::new();
        source.state().records = records;
        source
    }

    /// Set the bytes written by downloads.
    pub fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        self.state().payload = payload.into();
    }

    /// Make every subsequent call fail with a network error.
    pub fn fail_with(&self, message: impl Into<String>) {
        self.state().failure = Some(message.into());
    }

    /// Number of query and download calls received.
    pub fn calls(&self) -> usize {
        self.state().calls
    }

    /// Filters received by the most recent query.
    pub fn last_filters(&self) -> Option<DatasetFilters> {
        self.state().last_filters.clone()
    }

    /// Target received by the most recent download.
    pub fn last_target(&self) -> Option<DownloadTarget> {
        self.state().last_target.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DatasetSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    async fn query(&self, filters: &DatasetFilters) -> Result<Vec<DatasetRecord>, SourceError> {
        let mut state = self.state();
        state.calls += 1;
        state.last_filters = Some(filters.clone());

        match &state.failure {
            Some(message) => Err(SourceError::Network(message.clone())),
            None => Ok(state.records.clone()),
        }
    }

    async fn download(&self, target: &DownloadTarget) -> Result<u64, SourceError> {
        let payload = {
            let mut state = self.state();
            state.calls += 1;
            state.last_target = Some(target.clone());

            if let Some(message) = &state.failure {
                return Err(SourceError::Network(message.clone()));
            }
            state.payload.clone()
        };

        tokio::fs::write(&target.path, &payload).await?;
        Ok(payload.len() as u64)
    }
}

/// Helper function to create a mock dataset record for testing.
pub fn make_record(id: &str, name: &str) -> DatasetRecord {
    let mut record = DatasetRecord::new();
    record.insert("id".to_string(), serde_json::Value::from(id));
    record.insert("name".to_string(), serde_json::Value::from(name));
    record
}

/// Helper function to create `count` records with IDs `DS_1_0`, `DS_2_0`, ...
pub fn make_records(count: usize) -> Vec<DatasetRecord> {
    (1..=count)
        .map(|i| make_record(&format!("DS_{}_0", i), &format!("dataset {}", i)))
        .collect()
}
