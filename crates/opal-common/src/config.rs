//! Configuration structures for OpalDB.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default page size in bytes.
pub const PAGE_SIZE: usize = 512;

/// Size of the page header in bytes.
pub const PAGE_HEADER_SIZE: usize = 16;

/// Engine configuration for an OpalDB instance.
///
/// Threaded explicitly into every component constructor; there is no
/// process-wide configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory for table and index files.
    pub data_dir: PathBuf,
    /// Page size in bytes.
    pub page_size: usize,
    /// Minimum degree `t` of the tree structures (clamped to >= 3).
    pub min_degree: usize,
    /// File extension for table files.
    pub table_ext: String,
    /// File extension for index files.
    pub index_ext: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            page_size: PAGE_SIZE,
            min_degree: 3,
            table_ext: ".tbl".to_string(),
            index_ext: ".ndx".to_string(),
        }
    }
}

impl EngineConfig {
    /// Returns the maximum encoded record size for this page size.
    ///
    /// Derived from the worst-case per-cell overhead of the slotted page
    /// layout: `(page_size - header) / 6 - 2`.
    pub fn max_record_size(&self) -> usize {
        (self.page_size - PAGE_HEADER_SIZE) / 6 - 2
    }

    /// Returns the effective minimum degree (never below 3).
    pub fn effective_min_degree(&self) -> usize {
        self.min_degree.max(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.page_size, 512);
        assert_eq!(config.min_degree, 3);
        assert_eq!(config.table_ext, ".tbl");
        assert_eq!(config.index_ext, ".ndx");
    }

    #[test]
    fn test_max_record_size_default() {
        let config = EngineConfig::default();
        // (512 - 16) / 6 - 2 = 80
        assert_eq!(config.max_record_size(), 80);
    }

    #[test]
    fn test_max_record_size_custom_page() {
        let config = EngineConfig {
            page_size: 1024,
            ..Default::default()
        };
        // (1024 - 16) / 6 - 2 = 166
        assert_eq!(config.max_record_size(), 166);
    }

    #[test]
    fn test_effective_min_degree_clamped() {
        let config = EngineConfig {
            min_degree: 2,
            ..Default::default()
        };
        assert_eq!(config.effective_min_degree(), 3);

        let config = EngineConfig {
            min_degree: 5,
            ..Default::default()
        };
        assert_eq!(config.effective_min_degree(), 5);
    }

    #[test]
    fn test_clone() {
        let config1 = EngineConfig::default();
        let config2 = config1.clone();
        assert_eq!(config1.page_size, config2.page_size);
        assert_eq!(config1.data_dir, config2.data_dir);
    }

    #[test]
    fn test_serde_roundtrip() {
        let original = EngineConfig::default();
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(original.data_dir, deserialized.data_dir);
        assert_eq!(original.page_size, deserialized.page_size);
        assert_eq!(original.min_degree, deserialized.min_degree);
        assert_eq!(original.table_ext, deserialized.table_ext);
        assert_eq!(original.index_ext, deserialized.index_ext);
    }
}
