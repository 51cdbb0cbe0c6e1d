use crate::fetch::DEFAULT_USER_AGENTS;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for dp-scraper
///
/// Every section is optional; missing keys fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where product pages come from and how they are requested
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Scheme and host of the product site; its host is the only one fetched
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Pool of User-Agent values, one chosen at random per request
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Outbound request throttling
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Maximum simultaneous requests to the source
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent")]
    pub max_concurrent_requests: u32,

    /// Minimum time between request starts (milliseconds)
    #[serde(rename = "minimum-delay-ms", default = "default_minimum_delay")]
    pub minimum_delay_ms: u64,
}

/// Ephemeral cache tier
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a cached snapshot (seconds)
    #[serde(rename = "ttl-secs", default = "default_ttl")]
    pub ttl_secs: u64,
}

/// Durable storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

/// HTTP API
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(rename = "listen-addr", default = "default_listen_addr")]
    pub listen_addr: String,
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ThrottleConfig {
    pub fn minimum_delay(&self) -> Duration {
        Duration::from_millis(self.minimum_delay_ms)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agents: default_user_agents(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent(),
            minimum_delay_ms: default_minimum_delay(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.amazon.com".to_string()
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_concurrent() -> u32 {
    2
}

fn default_minimum_delay() -> u64 {
    2000
}

fn default_ttl() -> u64 {
    20 * 60
}

fn default_database_path() -> String {
    "./products.db".to_string()
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}
