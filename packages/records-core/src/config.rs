//! Service configuration.

use std::path::PathBuf;

use crate::model::BCRYPT_COST;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct RecordsConfig {
    /// Data directory for snapshot persistence (`None` keeps everything in memory)
    pub data_dir: Option<PathBuf>,
    /// Interval between persistence phases in milliseconds
    pub persistence_interval_ms: u64,
    /// Capacity of the API request channel
    pub api_queue_capacity: usize,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Response timeout in milliseconds
    pub response_timeout_ms: u64,
    /// Maximum retry attempts for transient I/O errors
    pub persistence_max_retries: u32,
    /// Delay between retry attempts in milliseconds
    pub persistence_retry_delay_ms: u64,
    /// Default page size for list endpoints (`None` = unlimited)
    pub default_list_limit: Option<usize>,
    /// Lifetime of tokens issued by the login endpoint, in seconds
    pub token_ttl_secs: u64,
    /// Bcrypt cost for stored passwords (4..=31)
    pub password_hash_cost: u32,
}

impl RecordsConfig {
    /// Returns a configuration that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            data_dir: None,
            ..Default::default()
        }
    }
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            data_dir: Some(PathBuf::from("./data")),
            persistence_interval_ms: 1000,
            api_queue_capacity: 1000,
            request_timeout_ms: 5000,        // 5 seconds default
            response_timeout_ms: 10000,      // 10 seconds default
            persistence_max_retries: 3,      // Default retry attempts
            persistence_retry_delay_ms: 100, // 100ms delay between retries
            default_list_limit: None,
            token_ttl_secs: 3600,
            password_hash_cost: BCRYPT_COST,
        }
    }
}
