//! Dataset archive download.

use std::path::{Path, PathBuf};

use crate::models::{DownloadOutcome, DownloadRequest, DownloadTarget};
use crate::sources::{DatasetSource, SourceError};

/// Download the dataset named in `request` into `download_dir`.
///
/// Parquet archives are saved as `<id>.tar.gz`, every other format as
/// `<id>.tar.xz`. An existing file at that path is overwritten; a failed
/// transfer may leave a partial file behind.
pub async fn download_dataset(
    source: &dyn DatasetSource,
    download_dir: &Path,
    request: &DownloadRequest,
) -> DownloadOutcome {
    match run(source, download_dir, request).await {
        Ok((path, bytes)) => {
            tracing::info!(path = %path.display(), bytes, "Dataset downloaded");
            DownloadOutcome::Saved { path, bytes }
        }
        Err(e) => {
            tracing::warn!("Dataset download failed: {}", e);
            DownloadOutcome::failure(e)
        }
    }
}

async fn run(
    source: &dyn DatasetSource,
    download_dir: &Path,
    request: &DownloadRequest,
) -> Result<(PathBuf, u64), SourceError> {
    let dataset_id = validate_dataset_id(request.dataset_id.as_deref())?;
    let target = DownloadTarget::new(dataset_id, request.format.clone(), download_dir);

    tracing::info!(
        source = source.id(),
        dataset_id,
        format = %target.format,
        "Downloading dataset"
    );

    tokio::fs::create_dir_all(download_dir).await?;
    let bytes = source.download(&target).await?;
    Ok((target.path, bytes))
}

/// The ID becomes a file name, so it must be non-empty and must not
/// reach outside the download directory.
fn validate_dataset_id(dataset_id: Option<&str>) -> Result<&str, SourceError> {
    let dataset_id = dataset_id.map(str::trim).unwrap_or_default();

    if dataset_id.is_empty() {
        return Err(SourceError::InvalidRequest(
            "dataset_id is required".to_string(),
        ));
    }

    if dataset_id.contains(['/', '\\']) || dataset_id.contains("..") {
        return Err(SourceError::InvalidRequest(format!(
            "dataset_id '{}' must not contain path separators",
            dataset_id
        )));
    }

    Ok(dataset_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DownloadFormat;
    use crate::sources::MockSource;
    use tempfile::tempdir;

    #[test]
    fn test_validate_dataset_id() {
        assert_eq!(validate_dataset_id(Some("DS_abc_0")).unwrap(), "DS_abc_0");
        assert_eq!(validate_dataset_id(Some(" DS_abc_0 ")).unwrap(), "DS_abc_0");
        assert!(validate_dataset_id(None).is_err());
        assert!(validate_dataset_id(Some("")).is_err());
        assert!(validate_dataset_id(Some("   ")).is_err());
        assert!(validate_dataset_id(Some("../etc/passwd")).is_err());
        assert!(validate_dataset_id(Some("a\\b")).is_err());
    }

    #[tokio::test]
    async fn test_parquet_download() {
        let dir = tempdir().unwrap();
        let source = MockSource::new();
        source.set_payload(b"archive".to_vec());

        let outcome = download_dataset(
            &source,
            dir.path(),
            &DownloadRequest::new("DS_abc123_0", "parquet"),
        )
        .await;

        let expected = dir.path().join("DS_abc123_0.tar.gz");
        assert_eq!(
            outcome,
            DownloadOutcome::Saved {
                path: expected.clone(),
                bytes: 7
            }
        );
        assert_eq!(std::fs::read(expected).unwrap(), b"archive");

        let target = source.last_target().unwrap();
        assert_eq!(target.remote_filename, "DS_abc123_0.tar.gz");
    }

    #[tokio::test]
    async fn test_original_download() {
        let dir = tempdir().unwrap();
        let source = MockSource::new();

        let outcome = download_dataset(
            &source,
            dir.path(),
            &DownloadRequest::new("DS_abc123_0", "original"),
        )
        .await;

        match outcome {
            DownloadOutcome::Saved { path, .. } => {
                assert_eq!(path, dir.path().join("DS_abc123_0.tar.xz"))
            }
            DownloadOutcome::Failure(e) => panic!("unexpected failure: {}", e),
        }

        let target = source.last_target().unwrap();
        assert_eq!(target.format, DownloadFormat::Raw("original".to_string()));
        assert_eq!(target.remote_filename, "DS_abc123_0");
    }

    #[tokio::test]
    async fn test_missing_id_makes_no_call() {
        let dir = tempdir().unwrap();
        let source = MockSource::new();

        let outcome = download_dataset(&source, dir.path(), &DownloadRequest::default()).await;

        assert_eq!(
            outcome,
            DownloadOutcome::Failure("Invalid request: dataset_id is required".to_string())
        );
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_creates_missing_download_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let source = MockSource::new();

        let outcome =
            download_dataset(&source, &nested, &DownloadRequest::new("DS_x_0", "parquet")).await;

        assert!(outcome.is_success());
        assert!(nested.join("DS_x_0.tar.gz").is_file());
    }

    #[tokio::test]
    async fn test_source_failure_becomes_failure_outcome() {
        let dir = tempdir().unwrap();
        let source = MockSource::new();
        source.fail_with("connection reset");

        let outcome =
            download_dataset(&source, dir.path(), &DownloadRequest::new("DS_x_0", "parquet"))
                .await;

        match outcome {
            DownloadOutcome::Failure(e) => assert!(e.contains("connection reset")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
