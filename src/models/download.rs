//! Dataset download request and target path derivation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::dataset::null_as_default;

/// Format a dataset can be downloaded in.
///
/// `parquet` is the dataset after ingestion into the database. Any other
/// value names a raw format (usually `original`) and is passed through to the
/// remote endpoint unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DownloadFormat {
    #[default]
    Parquet,
    Raw(String),
}

impl DownloadFormat {
    pub fn as_str(&self) -> &str {
        match self {
            DownloadFormat::Parquet => "parquet",
            DownloadFormat::Raw(name) => name,
        }
    }

    /// File extension appended locally for this format
    pub fn extension(&self) -> &'static str {
        match self {
            DownloadFormat::Parquet => "tar.gz",
            DownloadFormat::Raw(_) => "tar.xz",
        }
    }
}

impl From<String> for DownloadFormat {
    fn from(value: String) -> Self {
        if value == "parquet" {
            DownloadFormat::Parquet
        } else {
            DownloadFormat::Raw(value)
        }
    }
}

impl From<&str> for DownloadFormat {
    fn from(value: &str) -> Self {
        DownloadFormat::from(value.to_string())
    }
}

impl From<DownloadFormat> for String {
    fn from(value: DownloadFormat) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of the download operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// ColabFit dataset ID, e.g. `DS_123456abcdef_0`
    #[serde(default)]
    pub dataset_id: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub format: DownloadFormat,
}

impl DownloadRequest {
    pub fn new(dataset_id: impl Into<String>, format: impl Into<DownloadFormat>) -> Self {
        Self {
            dataset_id: Some(dataset_id.into()),
            format: format.into(),
        }
    }
}

/// Where a dataset is fetched from and written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub format: DownloadFormat,

    /// Filename requested from the remote endpoint
    pub remote_filename: String,

    /// Local destination path
    pub path: PathBuf,
}

impl DownloadTarget {
    /// Derive the target for `dataset_id` inside `download_dir`.
    ///
    /// Parquet archives keep their `.tar.gz` name on both ends. Raw archives
    /// are requested by bare ID and stored as `<id>.tar.xz`.
    pub fn new(dataset_id: &str, format: DownloadFormat, download_dir: &Path) -> Self {
        let remote_filename = match format {
            DownloadFormat::Parquet => format!("{}.{}", dataset_id, format.extension()),
            DownloadFormat::Raw(_) => dataset_id.to_string(),
        };
        let path = download_dir.join(format!("{}.{}", dataset_id, format.extension()));

        Self {
            format,
            remote_filename,
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parquet_target() {
        let target = DownloadTarget::new(
            "DS_abc123_0",
            DownloadFormat::Parquet,
            Path::new("/home/user/Downloads"),
        );
        assert_eq!(target.remote_filename, "DS_abc123_0.tar.gz");
        assert_eq!(
            target.path,
            PathBuf::from("/home/user/Downloads/DS_abc123_0.tar.gz")
        );
    }

    #[test]
    fn test_original_target() {
        let target = DownloadTarget::new(
            "DS_abc123_0",
            DownloadFormat::from("original"),
            Path::new("/home/user/Downloads"),
        );
        assert_eq!(target.remote_filename, "DS_abc123_0");
        assert_eq!(
            target.path,
            PathBuf::from("/home/user/Downloads/DS_abc123_0.tar.xz")
        );
        assert_eq!(target.format.as_str(), "original");
    }

    #[test]
    fn test_unknown_format_is_raw() {
        let format = DownloadFormat::from("xyz");
        assert_eq!(format, DownloadFormat::Raw("xyz".to_string()));
        assert_eq!(format.extension(), "tar.xz");
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: DownloadRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(request.dataset_id, None);
        assert_eq!(request.format, DownloadFormat::Parquet);

        let request: DownloadRequest =
            serde_json::from_value(json!({"dataset_id": "DS_1_0", "format": "original"}))
                .unwrap();
        assert_eq!(request, DownloadRequest::new("DS_1_0", "original"));
    }

    #[test]
    fn test_request_null_format_is_parquet() {
        let request: DownloadRequest =
            serde_json::from_value(json!({"dataset_id": "DS_1_0", "format": null})).unwrap();
        assert_eq!(request.format, DownloadFormat::Parquet);
    }
}
