//! Configuration for the review manager service

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Startup configuration passed to the service runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Database connection URL (MySQL/TiDB, or SQLite for local runs)
    pub database_url: String,

    /// gRPC listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Serve gRPC reflection
    #[serde(default = "default_true")]
    pub enable_reflection: bool,

    /// Maximum database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Database connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Upper bound on a single RPC in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enable SQL query logging
    #[serde(default)]
    pub enable_sql_logging: bool,

    /// Create the reviews table at startup when it is missing
    #[serde(default)]
    pub create_schema: bool,

    /// Replace storage error details with a generic message in responses
    #[serde(default)]
    pub redact_internal_errors: bool,
}

impl ServiceConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            listen_addr: default_listen_addr(),
            enable_reflection: true,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            enable_sql_logging: false,
            create_schema: false,
            redact_internal_errors: false,
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:50051".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    50
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    10
}
