// src/sources.rs
//! The two watched portals and how each one is wired.

use anyhow::{anyhow, Result};
use std::str::FromStr;

use crate::config::{MailConfig, SourceConfig};
use crate::extract::{BidCardExtractor, FirstTableExtractor};
use crate::fetch::{RenderedFetcher, StaticFetcher};
use crate::notify::EmailNotifier;
use crate::pipeline::{RunReport, TenderPipeline};

pub const GEM_URL: &str = "https://bidplus.gem.gov.in/all-bids";
pub const GEM_STATE_FILE: &str = "processed_gem.txt";

pub const LNMIIT_URL: &str = "https://lnmiit.ac.in/tenders/";
pub const LNMIIT_STATE_FILE: &str = "processed_lnmiit.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Gem,
    Lnmiit,
}

impl SourceKind {
    pub const ALL: [SourceKind; 2] = [SourceKind::Gem, SourceKind::Lnmiit];

    pub fn config(self) -> SourceConfig {
        match self {
            SourceKind::Gem => gem_config(),
            SourceKind::Lnmiit => lnmiit_config(),
        }
    }

    pub fn pipeline(self, config: SourceConfig, mail: MailConfig) -> Result<TenderPipeline> {
        match self {
            SourceKind::Gem => Ok(gem_pipeline(config, mail)),
            SourceKind::Lnmiit => lnmiit_pipeline(config, mail),
        }
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gem" => Ok(SourceKind::Gem),
            "lnmiit" => Ok(SourceKind::Lnmiit),
            other => Err(anyhow!("unknown source `{other}` (expected gem|lnmiit)")),
        }
    }
}

pub fn gem_config() -> SourceConfig {
    SourceConfig::new("GeM", GEM_URL, GEM_STATE_FILE).with_links(true)
}

pub fn lnmiit_config() -> SourceConfig {
    SourceConfig::new("LNMIIT", LNMIIT_URL, LNMIIT_STATE_FILE)
}

/// Client-side rendered listing, read through a headless browser.
pub fn gem_pipeline(config: SourceConfig, mail: MailConfig) -> TenderPipeline {
    let fetcher = RenderedFetcher::new(&config.url);
    let extractor = BidCardExtractor::new(&config.url);
    TenderPipeline::new(
        config,
        Box::new(fetcher),
        Box::new(extractor),
        Box::new(EmailNotifier::new(mail)),
    )
}

/// Plain HTML table over a TLS chain that does not validate.
pub fn lnmiit_pipeline(config: SourceConfig, mail: MailConfig) -> Result<TenderPipeline> {
    let fetcher = StaticFetcher::new(&config.url)?;
    Ok(TenderPipeline::new(
        config,
        Box::new(fetcher),
        Box::new(FirstTableExtractor::new()),
        Box::new(EmailNotifier::new(mail)),
    ))
}

/// Build `kind` from its defaults plus environment and run one cycle.
/// Setup problems are logged and reported as `None`; they never escape.
pub async fn run_from_env(kind: SourceKind) -> Option<RunReport> {
    let config = match kind.config().apply_env_overrides() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(source = ?kind, error = ?e, "invalid source configuration");
            return None;
        }
    };
    match kind.pipeline(config, MailConfig::from_env()) {
        Ok(pipeline) => Some(pipeline.run_once().await),
        Err(e) => {
            tracing::error!(source = ?kind, error = ?e, "could not build pipeline");
            None
        }
    }
}
