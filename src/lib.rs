//! # ColabFit MCP
//!
//! A Model Context Protocol (MCP) server for querying and downloading datasets
//! from the ColabFit materials and chemical database.
//!
//! ## Architecture
//!
//! - [`models`]: Query filters, pagination, download targets and result envelopes
//! - [`sources`]: The [`DatasetSource`] trait and the ColabFit HTTP source
//! - [`operations`]: `dataset_query` and `download_dataset`, which always return an outcome
//! - [`mcp`]: MCP tool registry and server
//! - [`utils`]: HTTP client and download directory helpers
//! - [`config`]: Configuration management

pub mod config;
pub mod mcp;
pub mod models;
pub mod operations;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use models::{DatasetFilters, DownloadOutcome, Pagination, QueryOutcome};
pub use sources::{ColabFitSource, DatasetSource, SourceError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
