// src/logging.rs
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact console logs, filtered by `RUST_LOG` (default: this crate at info).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tender_watch=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
