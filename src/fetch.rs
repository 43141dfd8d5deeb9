// src/fetch.rs

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{Result, ScrapeError};

/// Source of raw page markup. Implementations decide how a page is
/// retrieved; the scraper only cares about the body or the failure.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

const USER_AGENT: &str = concat!("mfscraper/", env!("CARGO_PKG_VERSION"));

/// `PageFetcher` over plain HTTP GET. No retries: a failed request is
/// reported once and the caller moves on.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Fails only when the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn fetch_error(url: &str, err: reqwest::Error) -> ScrapeError {
    ScrapeError::Fetch {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(url, e))?
            .error_for_status()
            .map_err(|e| fetch_error(url, e))?
            .text()
            .await
            .map_err(|e| fetch_error(url, e))?;
        debug!(bytes = body.len(), "fetched page");
        Ok(body)
    }
}
