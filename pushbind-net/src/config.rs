use serde::{Deserialize, Serialize};

/// Configuration for the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every call path is appended to.
    pub base_url: String,
    /// Ceiling for a whole request (ms).
    pub request_timeout_ms: u64,
    /// Ceiling for establishing a connection (ms).
    pub connect_timeout_ms: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3060".to_string(),
            request_timeout_ms: 60_000,
            connect_timeout_ms: 20_000,
            user_agent: concat!("pushbind/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
