// src/pipeline.rs
//! One cycle for one source: fetch → extract → filter → notify.
//!
//! Nothing in here returns an error to the caller. Each failure is reduced to
//! a log line plus a [`RunOutcome`], and the next scheduled run is the retry.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use scraper::Html;

use crate::config::SourceConfig;
use crate::extract::TenderExtractor;
use crate::fetch::PageFetcher;
use crate::filter::{select_new, FilterOutcome};
use crate::notify::{Delivery, Notifier, TenderDigest};
use crate::store::TenderStore;
use crate::types::TenderRecord;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("tender_runs_total", "Pipeline cycles started.");
        describe_counter!(
            "tender_extracted_total",
            "Records extracted from listing pages."
        );
        describe_counter!(
            "tender_accepted_total",
            "New relevant records accepted and persisted."
        );
        describe_counter!("tender_fetch_errors_total", "Page fetch failures.");
        describe_counter!(
            "tender_store_errors_total",
            "State file writes that failed mid-run."
        );
        describe_counter!(
            "tender_notify_errors_total",
            "Digest delivery failures."
        );
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    FetchFailed,
    /// State file could not be read, or its first write failed so nothing
    /// was accepted.
    StoreFailed,
    NoNewItems,
    NotifySkipped,
    Notified,
    NotifyFailed,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub source: String,
    pub extracted: usize,
    pub accepted: Vec<TenderRecord>,
    pub outcome: RunOutcome,
    /// The state file rejected a write during filtering. `accepted` then holds
    /// only what was persisted before the failure.
    pub store_failed: bool,
}

pub struct TenderPipeline {
    config: SourceConfig,
    store: TenderStore,
    fetcher: Box<dyn PageFetcher>,
    extractor: Box<dyn TenderExtractor>,
    notifier: Box<dyn Notifier>,
}

impl TenderPipeline {
    pub fn new(
        config: SourceConfig,
        fetcher: Box<dyn PageFetcher>,
        extractor: Box<dyn TenderExtractor>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let store = TenderStore::new(config.state_path.clone());
        Self {
            config,
            store,
            fetcher,
            extractor,
            notifier,
        }
    }

    pub async fn run_once(&self) -> RunReport {
        ensure_metrics_described();
        counter!("tender_runs_total").increment(1);

        let label = self.config.label.as_str();
        tracing::info!(source = label, url = %self.config.url, "checking portal");

        let report = |extracted, accepted, outcome, store_failed| RunReport {
            source: label.to_string(),
            extracted,
            accepted,
            outcome,
            store_failed,
        };

        let mut processed = match self.store.load() {
            Ok(set) => set,
            Err(e) => {
                tracing::error!(source = label, error = ?e, "could not load state file");
                return report(0, Vec::new(), RunOutcome::StoreFailed, true);
            }
        };

        let page = match self.fetcher.fetch().await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(
                    source = label,
                    fetcher = self.fetcher.name(),
                    error = ?e,
                    "error fetching portal"
                );
                counter!("tender_fetch_errors_total").increment(1);
                return report(0, Vec::new(), RunOutcome::FetchFailed, false);
            }
        };

        let (extracted, filtered) = self.collect_new(&page, &mut processed);
        let store_failed = filtered.store_error.is_some();
        if let Some(e) = &filtered.store_error {
            // Whatever was persisted before the failure still goes out below.
            tracing::error!(source = label, error = ?e, "error recording processed tenders");
            counter!("tender_store_errors_total").increment(1);
        }
        counter!("tender_extracted_total").increment(extracted as u64);
        counter!("tender_accepted_total").increment(filtered.accepted.len() as u64);
        tracing::info!(
            source = label,
            extracted,
            accepted = filtered.accepted.len(),
            already_seen = filtered.already_seen,
            irrelevant = filtered.irrelevant,
            "filtered listing"
        );

        let accepted = filtered.accepted;
        if accepted.is_empty() {
            if store_failed {
                return report(extracted, accepted, RunOutcome::StoreFailed, true);
            }
            tracing::info!(source = label, "no new items");
            return report(extracted, accepted, RunOutcome::NoNewItems, false);
        }

        let digest = TenderDigest::new(label, accepted, self.config.show_links);
        let outcome = match self.notifier.send(&digest).await {
            Ok(Delivery::Sent) => RunOutcome::Notified,
            Ok(Delivery::Skipped) => RunOutcome::NotifySkipped,
            Err(e) => {
                // State already records these; they will not be sent again.
                tracing::error!(source = label, error = ?e, "failed to send email");
                counter!("tender_notify_errors_total").increment(1);
                RunOutcome::NotifyFailed
            }
        };
        report(extracted, digest.records, outcome, store_failed)
    }

    /// Parse + filter in one synchronous step; the parsed document never
    /// lives across an await point.
    fn collect_new(
        &self,
        page: &str,
        processed: &mut std::collections::HashSet<String>,
    ) -> (usize, FilterOutcome) {
        let doc = Html::parse_document(page);
        let mut extracted = 0usize;
        let records = self.extractor.extract(&doc).inspect(|_| extracted += 1);
        let outcome = select_new(records, processed, &self.config.keywords, &self.store);
        (extracted, outcome)
    }
}
