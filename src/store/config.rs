//! Store configuration

use super::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Accept statements in named graphs
    pub with_graph_name: bool,
    /// Give transactions a fixed snapshot (serializable isolation)
    pub snapshots: bool,
    /// Allow writes after load
    pub mutable: bool,
    /// Identifier of the dataset
    pub uri: Option<String>,
    /// Human-readable title
    pub title: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            with_graph_name: true,
            snapshots: true,
            mutable: true,
            uri: None,
            title: None,
        }
    }
}

impl StoreConfig {
    /// Configuration for a store that is read-only after load
    pub fn immutable() -> Self {
        Self {
            mutable: false,
            ..Self::default()
        }
    }

    /// Parse YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> StoreResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| StoreError::Config(e.to_string()))
    }

    /// Read a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
    }

    /// Render as YAML
    pub fn to_yaml(&self) -> StoreResult<String> {
        serde_yaml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.with_graph_name);
        assert!(config.snapshots);
        assert!(config.mutable);
        assert!(config.uri.is_none());
    }

    #[test]
    fn test_partial_yaml() {
        let config = StoreConfig::from_yaml_str("snapshots: false\ntitle: scratch\n").unwrap();
        assert!(!config.snapshots);
        assert!(config.mutable);
        assert_eq!(config.title.as_deref(), Some("scratch"));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = StoreConfig::from_yaml_str("mutable: [not, a, bool]");
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "with_graph_name: false").unwrap();
        writeln!(file, "uri: http://example.org/dataset").unwrap();

        let config = StoreConfig::from_file(file.path()).unwrap();
        assert!(!config.with_graph_name);
        assert_eq!(config.uri.as_deref(), Some("http://example.org/dataset"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = StoreConfig::from_file(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = StoreConfig::immutable();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(StoreConfig::from_yaml_str(&yaml).unwrap(), config);
    }
}
