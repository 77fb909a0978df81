//! Configuration file support for colabfit-mcp.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api]
//! base_url = "https://materials.colabfit.org/mcp"
//! # Optional; COLABFIT_USERNAME / COLABFIT_PASSWORD take precedence
//! username = "mcp-tool"
//! password = "mcp-secret"
//!
//! [downloads]
//! directory = "/data/colabfit"
//! chunk_size = 10000000
//!
//! [http]
//! timeout_secs = 600
//! connect_timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::path::Path;

use super::Config;

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config file already exists: {0}")]
    AlreadyExists(String),
}

/// Write the default configuration to `path` as TOML.
///
/// Parent directories are created as needed. An existing file is only
/// replaced when `force` is set. Credentials are not written.
pub fn write_default_config(path: &Path, force: bool) -> Result<(), ConfigFileError> {
    if path.exists() && !force {
        return Err(ConfigFileError::AlreadyExists(path.display().to_string()));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
    }

    let content = toml::to_string_pretty(&Config::default())
        .map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_config_with, DEFAULT_BASE_URL};
    use tempfile::tempdir;

    #[test]
    fn test_write_default_config_round_trips_through_loader() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path, false).unwrap();

        let config = load_config_with(Some(&path), |_| None).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.downloads.chunk_size, 10_000_000);
    }

    #[test]
    fn test_written_default_config_defers_to_credential_vars() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        write_default_config(&path, false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("password"));

        let config = load_config_with(Some(&path), |name| match name {
            "COLABFIT_USERNAME" => Some("rotated-user".to_string()),
            "COLABFIT_PASSWORD" => Some("rotated-pass".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api.username, "rotated-user");
        assert_eq!(config.api.password, "rotated-pass");
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine").unwrap();

        let result = write_default_config(&path, false);
        assert!(matches!(result, Err(ConfigFileError::AlreadyExists(_))));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine");

        write_default_config(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("base_url"));
    }
}
