//! Database configuration.

use std::path::PathBuf;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database name
    pub name: String,
    /// Data directory for persistence
    pub data_dir: PathBuf,
    /// Maximum serialized value size per record in bytes
    pub max_value_size: usize,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            name: "db".to_string(),
            data_dir: PathBuf::from("./data"),
            max_value_size: 1024 * 1024,     // 1 MiB per record
            persistence_max_retries: 3,      // Default retry attempts
            persistence_retry_delay_ms: 100, // 100ms delay between retries
        }
    }
}
