//! Core data models for dataset queries and downloads.

mod dataset;
mod download;
mod outcome;

pub use dataset::{
    DatasetFilters, DatasetRecord, License, Pagination, PropertyType, SortBy, SortDirection,
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE,
};
pub use download::{DownloadFormat, DownloadRequest, DownloadTarget};
pub use outcome::{DownloadOutcome, QueryOutcome, QueryPage};
