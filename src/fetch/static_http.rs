// src/fetch/static_http.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use super::PageFetcher;

pub const DEFAULT_STATIC_TIMEOUT_SECS: u64 = 30;

/// Plain GET for portals that serve server-rendered HTML.
///
/// Certificate validation is off: the LNMIIT site ships an incomplete chain
/// and nothing sensitive is sent over this connection.
pub struct StaticFetcher {
    url: String,
    client: reqwest::Client,
}

impl StaticFetcher {
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_STATIC_TIMEOUT_SECS)
    }

    pub fn with_timeout(url: &str, secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(secs))
            .build()
            .context("building http client")?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self) -> Result<String> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?;
        tracing::debug!(url = %self.url, status = %resp.status(), "static fetch response");
        resp.text().await.context("reading response body")
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
