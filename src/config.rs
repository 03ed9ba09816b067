use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "Corrigo";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the backend base URL.
pub const ENV_BACKEND_URL: &str = "CORRIGO_BACKEND_URL";

/// Default backend address when the environment does not name one.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}

/// Connection settings for the correction backend. The base endpoint address
/// is the only external configuration the core consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    base_url: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl BackendConfig {
    /// Configuration for an explicit base URL. A trailing slash is trimmed so
    /// endpoint paths can be appended uniformly.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Read the base URL from `CORRIGO_BACKEND_URL`, falling back to the
    /// default local address.
    pub fn from_env() -> Self {
        let base = std::env::var(ENV_BACKEND_URL).unwrap_or_else(|_| DEFAULT_BACKEND_URL.into());
        Self::new(&base)
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the stored original artifact, for human-facing preview.
    pub fn artifact_url(&self, filename: &str) -> String {
        format!("{}/uploads/{}", self.base_url, filename)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}
