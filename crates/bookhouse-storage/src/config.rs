//! Gateway Configuration
//!
//! This module defines configuration for the content gateway.
//!
//! ## GatewayConfig
//!
//! Controls where objects land and how download links behave:
//!
//! - **key_prefix**: Object key prefix for uploaded content (default: "books")
//! - **url_ttl_secs**: Signed download URL lifetime in seconds (default: 3600)
//!
//! ## Usage
//!
//! ```ignore
//! use bookhouse_storage::GatewayConfig;
//!
//! let config = GatewayConfig {
//!     key_prefix: "library".to_string(),
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Object key prefix for uploaded content (default: "books")
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Signed download URL lifetime in seconds (default: 1 hour)
    #[serde(default = "default_url_ttl_secs")]
    pub url_ttl_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            url_ttl_secs: default_url_ttl_secs(),
        }
    }
}

fn default_key_prefix() -> String {
    "books".to_string()
}

fn default_url_ttl_secs() -> u64 {
    3600 // 1 hour
}
