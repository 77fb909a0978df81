//! The two tool operations.
//!
//! These are the boundary where typed [`SourceError`](crate::sources::SourceError)s
//! turn into failure envelopes: both functions always return an outcome.

mod download;
mod query;

pub use download::download_dataset;
pub use query::dataset_query;
