//! tender-watch: run one cycle for each named portal (all of them by default).
//!
//! Usage: `tender-watch [gem|lnmiit]...`

use anyhow::Result;
use tender_watch::sources::{run_from_env, SourceKind};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    tender_watch::logging::init_tracing();

    let kinds: Vec<SourceKind> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            SourceKind::ALL.to_vec()
        } else {
            args.iter().map(|a| a.parse::<SourceKind>()).collect::<Result<_>>()?
        }
    };

    // Sequential on purpose: sources never share a cycle.
    for kind in kinds {
        if let Some(report) = run_from_env(kind).await {
            tracing::info!(
                source = %report.source,
                outcome = ?report.outcome,
                accepted = report.accepted.len(),
                "cycle finished"
            );
        }
    }
    Ok(())
}
