// src/lib.rs
// Public library surface for the watcher binaries and integration tests.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod logging;
pub mod notify;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod text;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::config::{MailConfig, SourceConfig};
pub use crate::pipeline::{RunOutcome, RunReport, TenderPipeline};
pub use crate::sources::SourceKind;
pub use crate::store::TenderStore;
pub use crate::types::TenderRecord;
