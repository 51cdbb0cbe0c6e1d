//! HTTP client construction
//!
//! The client is built once per controller. The User-Agent header is not
//! baked into the client; it is drawn from a pool for every request.

use crate::config::SourceConfig;
use rand::seq::SliceRandom;
use reqwest::{redirect::Policy, Client};

/// Maximum number of same-host redirects followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// Browser identities used when the configuration supplies none
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
];

/// Pool of User-Agent values
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Creates a pool, falling back to the built-in identities when empty
    pub fn new(agents: Vec<String>) -> Self {
        let agents: Vec<String> = agents
            .into_iter()
            .filter(|agent| !agent.trim().is_empty())
            .collect();

        if agents.is_empty() {
            Self::default()
        } else {
            Self { agents }
        }
    }

    /// Draws one identity uniformly at random
    pub fn pick(&self) -> &str {
        self.agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

/// Builds an HTTP client for the source site
///
/// Redirects are followed only while they stay on `allowed_host`. A redirect
/// toward any other host is not followed; the 3xx response is handed back to
/// the caller, which reports it as an off-domain block.
///
/// # Arguments
///
/// * `config` - Source configuration (timeouts, base URL)
/// * `allowed_host` - The only host requests may reach
///
/// # Example
///
/// ```no_run
/// use dp_scraper::config::SourceConfig;
/// use dp_scraper::fetch::build_http_client;
///
/// let config = SourceConfig::default();
/// let client = build_http_client(&config, "www.amazon.com").unwrap();
/// ```
pub fn build_http_client(config: &SourceConfig, allowed_host: &str) -> Result<Client, reqwest::Error> {
    let allowed = allowed_host.to_string();
    let redirect_policy = Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if attempt.url().host_str() == Some(allowed.as_str()) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    });

    Client::builder()
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(redirect_policy)
        .https_only(config.base_url.starts_with("https://"))
        .gzip(true)
        .brotli(true)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let config = SourceConfig::default();
        assert!(build_http_client(&config, "www.amazon.com").is_ok());
    }

    #[test]
    fn test_build_plain_http_client() {
        let config = SourceConfig {
            base_url: "http://127.0.0.1:8080".to_string(),
            ..SourceConfig::default()
        };
        assert!(build_http_client(&config, "127.0.0.1").is_ok());
    }

    #[test]
    fn test_pool_picks_configured_agent() {
        let pool = UserAgentPool::new(vec!["AgentA/1.0".to_string(), "AgentB/2.0".to_string()]);
        assert_eq!(pool.len(), 2);

        for _ in 0..20 {
            let agent = pool.pick();
            assert!(agent == "AgentA/1.0" || agent == "AgentB/2.0");
        }
    }

    #[test]
    fn test_empty_pool_falls_back_to_builtin() {
        let pool = UserAgentPool::new(vec![" ".to_string()]);
        assert_eq!(pool.len(), DEFAULT_USER_AGENTS.len());
        assert!(DEFAULT_USER_AGENTS.contains(&pool.pick()));
    }
}
