//! Local download directory resolution.

use std::path::PathBuf;

use crate::config::DownloadConfig;

/// Resolve the directory downloaded datasets are written to.
///
/// The configured directory wins; otherwise the platform download directory,
/// then `~/Downloads`. Returns `None` when no home directory can be found.
pub fn download_dir(config: &DownloadConfig) -> Option<PathBuf> {
    config
        .directory
        .clone()
        .or_else(dirs::download_dir)
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}
