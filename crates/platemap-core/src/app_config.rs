use std::path::PathBuf;
use std::time::Duration;

use crate::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub geocoder_base_url: String,
    pub geocoder_user_agent: String,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub suggestion_limit: u32,
    pub geocoder_max_retries: u32,
    pub geocoder_backoff_base_ms: u64,
    pub id_cache_path: PathBuf,
    /// Where the map opens when the operator has no saved location yet.
    pub default_position: Position,
}

impl AppConfig {
    #[must_use]
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// ANSI-colored log output, enabled in development only.
    #[must_use]
    pub fn ansi_logs(&self) -> bool {
        self.env == Environment::Development
    }
}
