//! Fetch controller
//!
//! Retrieves one product page per call. Every request goes through the shared
//! throttle and carries a randomly chosen User-Agent.

use crate::config::SourceConfig;
use crate::fetch::client::{build_http_client, UserAgentPool};
use crate::fetch::{FetchError, FetchedPage, Throttle};
use reqwest::header::{HeaderMap, LOCATION, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

/// Fetches product detail pages from the configured source host
#[derive(Debug)]
pub struct FetchController {
    client: Client,
    base_url: Url,
    allowed_domain: String,
    agents: UserAgentPool,
    throttle: Arc<Throttle>,
}

impl FetchController {
    /// Creates a controller for the configured source
    ///
    /// # Arguments
    ///
    /// * `config` - Source configuration
    /// * `throttle` - Process-wide throttle shared with every other fetch
    pub fn new(config: &SourceConfig, throttle: Arc<Throttle>) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let allowed_domain = base_url
            .host_str()
            .ok_or_else(|| FetchError::InvalidUrl(format!("{}: no host", config.base_url)))?
            .to_string();

        let client = build_http_client(config, &allowed_domain).map_err(|source| {
            FetchError::Transport {
                url: config.base_url.clone(),
                source,
            }
        })?;

        Ok(Self {
            client,
            base_url,
            allowed_domain,
            agents: UserAgentPool::new(config.user_agents.clone()),
            throttle,
        })
    }

    /// The only host this controller will contact
    pub fn allowed_domain(&self) -> &str {
        &self.allowed_domain
    }

    pub fn throttle(&self) -> &Arc<Throttle> {
        &self.throttle
    }

    /// Builds the product page URL for a code
    ///
    /// The code is pushed as a single percent-encoded path segment, so it can
    /// never change the host or climb out of `/dp/`.
    pub fn product_url(&self, code: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .push("dp")
            .push(code);

        Ok(url)
    }

    /// Fetches the product page for a code
    ///
    /// # Request Flow
    ///
    /// 1. Build the URL and wait for the throttle
    /// 2. Send a GET with a random User-Agent
    /// 3. A redirect left unfollowed because it points at another host
    ///    becomes `OffDomain`
    /// 4. Any other non-2xx status, including an unfollowed same-host 3xx,
    ///    becomes `Status`, carrying the body
    ///
    /// No retry is attempted.
    pub async fn fetch(&self, code: &str) -> Result<FetchedPage, FetchError> {
        let url = self.product_url(code)?;
        let _permit = self
            .throttle
            .acquire()
            .await
            .map_err(|_| FetchError::Closed)?;

        tracing::info!("Fetching {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.agents.pick())
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();

        if status.is_redirection() {
            if let Some(target) = self.off_domain_target(response.url(), response.headers()) {
                tracing::warn!("Blocked redirect from {} to {}", response.url(), target);
                return Err(FetchError::OffDomain {
                    url: target.to_string(),
                    allowed: self.allowed_domain.clone(),
                });
            }
        }

        let final_url = response.url().to_string();

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: final_url.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }

    /// Resolves a redirect's `Location` and returns it if it leaves the allowed host
    fn off_domain_target(&self, from: &Url, headers: &HeaderMap) -> Option<Url> {
        let location = headers.get(LOCATION)?.to_str().ok()?;
        let target = from.join(location).ok()?;
        (target.host_str() != Some(self.allowed_domain.as_str())).then_some(target)
    }

    /// Waits until every in-flight fetch has finished
    pub async fn wait(&self) {
        self.throttle.drain().await;
    }

    /// Refuses new fetches, then waits for the in-flight ones
    pub async fn shutdown(&self) {
        self.throttle.close();
        self.wait().await;
    }
}
