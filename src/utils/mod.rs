//! Utility modules shared by the sources and the CLI.
//!
//! - [`HttpClient`]: reqwest client built from [`HttpConfig`](crate::config::HttpConfig)
//! - [`download_dir`]: where downloaded datasets are written

mod http;
mod paths;

pub use http::HttpClient;
pub use paths::download_dir;
