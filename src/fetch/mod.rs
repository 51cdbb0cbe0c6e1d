//! Fetch module for dp-scraper
//!
//! This module retrieves product detail pages from the source site:
//! - Building the HTTP client and the User-Agent pool
//! - Building the product URL from a product code
//! - Throttling outbound requests (concurrency ceiling and minimum delay)
//! - Classifying transport, status and off-domain failures

mod client;
mod controller;
mod throttle;

pub use client::{build_http_client, UserAgentPool, DEFAULT_USER_AGENTS, MAX_REDIRECTS};
pub use controller::FetchController;
pub use throttle::{
    Throttle, ThrottleClosed, ThrottlePermit, DEFAULT_MAX_CONCURRENT, DEFAULT_MINIMUM_DELAY,
};

use thiserror::Error;

/// Errors that can occur while fetching a product page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Refusing to leave {allowed}: redirected to {url}")]
    OffDomain { url: String, allowed: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid product URL: {0}")]
    InvalidUrl(String),

    #[error("Fetch controller is shut down")]
    Closed,
}

impl FetchError {
    /// Raw response body captured with the failure, if any
    pub fn response_body(&self) -> Option<&str> {
        match self {
            FetchError::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after same-host redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Page body
    pub body: String,
}
