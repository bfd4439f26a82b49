//! Runs a single GeM portal cycle and exits; meant for an external scheduler.

use tender_watch::sources::{run_from_env, SourceKind};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    tender_watch::logging::init_tracing();

    if let Some(report) = run_from_env(SourceKind::Gem).await {
        tracing::info!(
            outcome = ?report.outcome,
            accepted = report.accepted.len(),
            "cycle finished"
        );
    }
}
