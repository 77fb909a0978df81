//! Tool handlers for the dataset operations.
//!
//! Arguments arrive as untyped JSON. They are decoded into the typed models
//! here; a decoding failure is reported through the same failure envelope as
//! any other error, so handlers never return `Err` for bad input.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::tools::ToolHandler;
use crate::models::{DatasetFilters, DownloadOutcome, DownloadRequest, Pagination, QueryOutcome};
use crate::operations::{dataset_query, download_dataset};
use crate::sources::DatasetSource;

/// Missing arguments are treated as an empty argument object
fn arguments(args: Value) -> Value {
    if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    }
}

/// Split tool arguments into remote filters and local pagination
fn parse_query_args(args: Value) -> Result<(DatasetFilters, Pagination), serde_json::Error> {
    let args = arguments(args);
    let filters = DatasetFilters::deserialize(&args)?;
    let pagination = serde_json::from_value(args)?;
    Ok((filters, pagination))
}

/// Handler for the `dataset_query` tool
#[derive(Debug)]
pub struct DatasetQueryHandler {
    pub source: Arc<dyn DatasetSource>,
}

#[async_trait::async_trait]
impl ToolHandler for DatasetQueryHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let outcome = match parse_query_args(args) {
            Ok((filters, pagination)) => {
                dataset_query(self.source.as_ref(), &filters, pagination).await
            }
            Err(e) => {
                tracing::warn!("Rejected dataset_query arguments: {}", e);
                QueryOutcome::failure(format!("Invalid arguments: {}", e))
            }
        };

        serde_json::to_value(outcome).map_err(|e| e.to_string())
    }
}

/// Handler for the `download_dataset` tool
#[derive(Debug)]
pub struct DownloadDatasetHandler {
    pub source: Arc<dyn DatasetSource>,
    pub download_dir: PathBuf,
}

#[async_trait::async_trait]
impl ToolHandler for DownloadDatasetHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let outcome = match serde_json::from_value::<DownloadRequest>(arguments(args)) {
            Ok(request) => {
                download_dataset(self.source.as_ref(), &self.download_dir, &request).await
            }
            Err(e) => {
                tracing::warn!("Rejected download_dataset arguments: {}", e);
                DownloadOutcome::failure(format!("Invalid arguments: {}", e))
            }
        };

        serde_json::to_value(outcome).map_err(|e| e.to_string())
    }
}
