// src/fetch/mod.rs
pub mod fixture;
pub mod rendered;
pub mod static_http;

pub use fixture::FixtureFetcher;
pub use rendered::{BrowserProfile, RenderedFetcher};
pub use static_http::StaticFetcher;

use anyhow::Result;

/// Retrieves the raw listing page for one fixed URL.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self) -> Result<String>;
    fn name(&self) -> &'static str;
}
