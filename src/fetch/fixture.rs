// src/fetch/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::PageFetcher;

/// Serves a stored document instead of touching the network.
pub struct FixtureFetcher {
    mode: Mode,
}

enum Mode {
    Page(String),
    Fail(String),
}

impl FixtureFetcher {
    pub fn from_html(html: &str) -> Self {
        Self {
            mode: Mode::Page(html.to_string()),
        }
    }

    /// Every fetch fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            mode: Mode::Fail(message.to_string()),
        }
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self) -> Result<String> {
        match &self.mode {
            Mode::Page(s) => Ok(s.clone()),
            Mode::Fail(msg) => Err(anyhow!("{msg}")),
        }
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
