// src/fetch/rendered.rs
//! Headless-browser fetch for portals that build their listing client-side.
//!
//! Rendering is delegated to Playwright running under Node as a child process.
//! The Rust side only hands it a job description (URL, profile, delays) and
//! reads the rendered document back from stdout.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::PageFetcher;

pub const DEFAULT_SETTLE_SECS: u64 = 10;
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 60;
/// Reserved out of the overall timeout for `page.content()` and `browser.close()`.
const TEARDOWN_HEADROOM: Duration = Duration::from_secs(5);
/// Playwright reads a zero timeout as "no limit".
const MIN_NAV_TIMEOUT: Duration = Duration::from_secs(1);

const JOB_ENV: &str = "TENDER_RENDER_JOB";

const RENDER_SCRIPT: &str = r#"
const { chromium } = require('playwright');
(async () => {
    const job = JSON.parse(process.env.TENDER_RENDER_JOB);
    const p = job.profile;
    let browser;
    let code = 0;
    try {
        browser = await chromium.launch({
            headless: true,
            args: [
                '--no-sandbox',
                '--disable-dev-shm-usage',
                `--window-size=${p.width},${p.height}`,
            ],
        });
        const context = await browser.newContext({
            userAgent: p.user_agent,
            viewport: { width: p.width, height: p.height },
            locale: p.languages[0],
        });
        await context.addInitScript((fp) => {
            Object.defineProperty(navigator, 'webdriver', { get: () => undefined });
            Object.defineProperty(navigator, 'languages', { get: () => fp.languages });
            Object.defineProperty(navigator, 'vendor', { get: () => fp.vendor });
            Object.defineProperty(navigator, 'platform', { get: () => fp.platform });
            const getParameter = WebGLRenderingContext.prototype.getParameter;
            WebGLRenderingContext.prototype.getParameter = function (param) {
                if (param === 37445) return fp.webgl_vendor;
                if (param === 37446) return fp.renderer;
                return getParameter.call(this, param);
            };
        }, p);
        const page = await context.newPage();
        await page.goto(job.url, { waitUntil: 'domcontentloaded', timeout: job.nav_timeout_ms });
        await page.waitForTimeout(job.settle_ms);
        process.stdout.write(await page.content());
    } catch (e) {
        console.error(String((e && e.stack) || e));
        code = 1;
    } finally {
        if (browser) await browser.close();
    }
    process.exit(code);
})();
"#;

/// Fingerprint handed to the browser session.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub width: u32,
    pub height: u32,
    pub languages: Vec<String>,
    pub vendor: String,
    pub platform: String,
    pub webgl_vendor: String,
    pub renderer: String,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            width: 1920,
            height: 1080,
            languages: vec!["en-US".into(), "en".into()],
            vendor: "Google Inc.".into(),
            platform: "Win32".into(),
            webgl_vendor: "Intel Inc.".into(),
            renderer: "Intel Iris OpenGL Engine".into(),
        }
    }
}

#[derive(Serialize)]
struct RenderJob<'a> {
    url: &'a str,
    profile: &'a BrowserProfile,
    settle_ms: u64,
    nav_timeout_ms: u64,
}

pub struct RenderedFetcher {
    url: String,
    profile: BrowserProfile,
    node_bin: String,
    settle: Duration,
    timeout: Duration,
}

impl RenderedFetcher {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            profile: BrowserProfile::default(),
            node_bin: "node".to_string(),
            settle: Duration::from_secs(DEFAULT_SETTLE_SECS),
            timeout: Duration::from_secs(DEFAULT_RENDER_TIMEOUT_SECS),
        }
    }

    pub fn with_node_bin(mut self, bin: impl Into<String>) -> Self {
        self.node_bin = bin.into();
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn job_json(&self) -> Result<String> {
        let job = RenderJob {
            url: &self.url,
            profile: &self.profile,
            settle_ms: self.settle.as_millis() as u64,
            // navigation gets what is left after the settle delay and teardown
            nav_timeout_ms: self
                .timeout
                .saturating_sub(self.settle)
                .saturating_sub(TEARDOWN_HEADROOM)
                .max(MIN_NAV_TIMEOUT)
                .as_millis() as u64,
        };
        serde_json::to_string(&job).context("serializing render job")
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self) -> Result<String> {
        let job = self.job_json()?;

        tracing::info!(url = %self.url, settle_secs = self.settle.as_secs(), "rendering page");

        // kill_on_drop: a timeout below drops the child and takes the browser with it
        let child = Command::new(&self.node_bin)
            .arg("-e")
            .arg(RENDER_SCRIPT)
            .env(JOB_ENV, job)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning {} for headless render", self.node_bin))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("render timed out after {:?}", self.timeout))?
            .context("waiting for headless render")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("headless render failed ({}): {}", output.status, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn name(&self) -> &'static str {
        "rendered"
    }
}
