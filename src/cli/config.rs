//! Configuration file
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/reeldb",
//!   "dataset_path": "/srv/movies.json",
//!   "snapshot_on_commit": true,
//!   "audit_enabled": true
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: String,

    /// JSON dataset used when no snapshot exists yet
    #[serde(default)]
    pub dataset_path: Option<String>,

    /// Save a snapshot after every committed mutation (default true)
    #[serde(default = "default_true")]
    pub snapshot_on_commit: bool,

    /// Append to the audit log after every committed mutation (default true)
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        if let Some(dataset) = &self.dataset_path {
            if dataset.trim().is_empty() {
                return Err(CliError::config_error("dataset_path must not be empty when set"));
            }
        }
        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    /// `<data_dir>/snapshot`
    pub fn snapshot_dir(&self) -> PathBuf {
        self.data_path().join("snapshot")
    }

    /// `<data_dir>/audit/audit.log`
    pub fn audit_path(&self) -> PathBuf {
        self.data_path().join("audit").join("audit.log")
    }

    pub fn dataset(&self) -> Option<&Path> {
        self.dataset_path.as_deref().map(Path::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reeldb.json");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults() {
        let (_dir, path) = write_config(r#"{"data_dir": "/tmp/reel"}"#);
        let config = Config::load(&path).unwrap();

        assert!(config.snapshot_on_commit);
        assert!(config.audit_enabled);
        assert!(config.dataset().is_none());
        assert_eq!(config.snapshot_dir(), Path::new("/tmp/reel/snapshot"));
        assert_eq!(config.audit_path(), Path::new("/tmp/reel/audit/audit.log"));
    }

    #[test]
    fn test_explicit_values() {
        let (_dir, path) = write_config(
            r#"{"data_dir": "d", "dataset_path": "m.json", "snapshot_on_commit": false, "audit_enabled": false}"#,
        );
        let config = Config::load(&path).unwrap();
        assert!(!config.snapshot_on_commit);
        assert!(!config.audit_enabled);
        assert_eq!(config.dataset(), Some(Path::new("m.json")));
    }

    #[test]
    fn test_missing_data_dir_rejected() {
        let (_dir, path) = write_config(r#"{"audit_enabled": true}"#);
        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.code_str(), "REEL_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_empty_data_dir_rejected() {
        let (_dir, path) = write_config(r#"{"data_dir": "  "}"#);
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/nonexistent/reeldb.json")).unwrap_err();
        assert!(err.message().contains("Failed to read config"));
    }
}
