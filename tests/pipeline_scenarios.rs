// tests/pipeline_scenarios.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use scraper::Html;
use tender_watch::extract::{BidCardExtractor, FirstTableExtractor, TenderExtractor};
use tender_watch::fetch::FixtureFetcher;
use tender_watch::notify::{Delivery, EmailNotifier, Notifier, TenderDigest};
use tender_watch::{MailConfig, RunOutcome, SourceConfig, TenderPipeline, TenderRecord};

/// Keeps every digest it is handed.
#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<TenderDigest>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, digest: &TenderDigest) -> Result<Delivery> {
        self.sent.lock().unwrap().push(digest.clone());
        Ok(Delivery::Sent)
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _digest: &TenderDigest) -> Result<Delivery> {
        Err(anyhow!("535 authentication failed"))
    }
}

fn gem_card(no: &str, items: &str, end: &str) -> String {
    format!(
        r#"<div class="bid_card"><p class="bid_no"><a href="/showbidDocument/{no}">{no}</a></p>
           <div class="col-md-4"><a>{items}</a></div><span class="end_date">{end}</span></div>"#
    )
}

fn gem_page(cards: &[String]) -> String {
    format!("<html><body>{}</body></html>", cards.concat())
}

fn config(state: &Path, keywords: &[&str]) -> SourceConfig {
    SourceConfig::new("GeM", "https://bidplus.gem.gov.in/all-bids", "unused.txt")
        .with_state_path(state)
        .with_keywords(keywords.iter().copied())
        .with_links(true)
}

fn pipeline(
    cfg: SourceConfig,
    page: &str,
    extractor: Box<dyn TenderExtractor>,
    notifier: Box<dyn Notifier>,
) -> TenderPipeline {
    TenderPipeline::new(cfg, Box::new(FixtureFetcher::from_html(page)), extractor, notifier)
}

/// Bid cards, except the state file is swapped for a directory just before
/// the second card is handed out, so every later append fails.
struct StateLostMidway {
    inner: BidCardExtractor,
    state: PathBuf,
}

impl TenderExtractor for StateLostMidway {
    fn extract<'a>(&'a self, doc: &'a Html) -> Box<dyn Iterator<Item = TenderRecord> + 'a> {
        let state = &self.state;
        Box::new(self.inner.extract(doc).enumerate().map(move |(i, rec)| {
            if i == 1 {
                fs::remove_file(state).unwrap();
                fs::create_dir(state).unwrap();
            }
            rec
        }))
    }

    fn name(&self) -> &'static str {
        "state-lost-midway"
    }
}

fn gem_extractor() -> Box<dyn TenderExtractor> {
    Box::new(BidCardExtractor::new("https://bidplus.gem.gov.in/all-bids"))
}

#[tokio::test]
async fn new_match_is_persisted_and_mailed_once() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let page = gem_page(&[gem_card("GEM/1", "AMC for Dell laptops", "2024-01-01")]);
    let rec = RecordingNotifier::default();

    let p = pipeline(config(&state, &["laptop"]), &page, gem_extractor(), Box::new(rec.clone()));
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::Notified);
    assert!(!report.store_failed);
    assert_eq!(report.extracted, 1);
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(fs::read_to_string(&state).unwrap(), "GEM/1\n");

    let sent = rec.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].records.len(), 1);
    assert_eq!(sent[0].records[0].tender_no, "GEM/1");
    assert_eq!(sent[0].records[0].last_date, "2024-01-01");
    // header row + exactly one data row
    assert_eq!(sent[0].html_body().matches("<tr>").count(), 2);
}

#[tokio::test]
async fn already_processed_is_not_resent() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    fs::write(&state, "GEM/1\n").unwrap();
    let page = gem_page(&[gem_card("GEM/1", "AMC for Dell laptops", "2024-01-01")]);
    let rec = RecordingNotifier::default();

    let p = pipeline(config(&state, &["laptop"]), &page, gem_extractor(), Box::new(rec.clone()));
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::NoNewItems);
    assert!(report.accepted.is_empty());
    assert!(rec.sent.lock().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&state).unwrap(), "GEM/1\n");
}

#[tokio::test]
async fn second_run_over_same_page_accepts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let page = gem_page(&[
        gem_card("GEM/1", "Dell laptop", "d1"),
        gem_card("GEM/2", "Rack server", "d2"),
        gem_card("GEM/3", "Printer paper", "d3"),
    ]);
    let rec = RecordingNotifier::default();
    let p = pipeline(
        config(&state, &["laptop", "server"]),
        &page,
        gem_extractor(),
        Box::new(rec.clone()),
    );

    let first = p.run_once().await;
    assert_eq!(first.accepted.len(), 2);
    let second = p.run_once().await;
    assert_eq!(second.outcome, RunOutcome::NoNewItems);
    assert!(second.accepted.is_empty());

    // each accepted id appears exactly once
    let content = fs::read_to_string(&state).unwrap();
    assert_eq!(content.lines().filter(|l| *l == "GEM/1").count(), 1);
    assert_eq!(content.lines().filter(|l| *l == "GEM/2").count(), 1);
    assert_eq!(content.lines().count(), 2);
    assert_eq!(rec.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_credentials_still_record_state() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let page = gem_page(&[gem_card("GEM/1", "AMC for Dell laptops", "2024-01-01")]);

    let p = pipeline(
        config(&state, &["laptop"]),
        &page,
        gem_extractor(),
        Box::new(EmailNotifier::new(MailConfig::default())),
    );
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::NotifySkipped);
    assert_eq!(report.accepted.len(), 1);
    assert_eq!(fs::read_to_string(&state).unwrap(), "GEM/1\n");
}

#[tokio::test]
async fn short_table_row_yields_no_new_items() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_lnmiit.txt");
    let page = r#"<table>
        <tr><th>S.No</th><th>Notification</th><th>Tender No</th></tr>
        <tr><td>1</td><td>AMC of laptops</td><td>LNM/1</td></tr>
    </table>"#;
    let rec = RecordingNotifier::default();

    let cfg = config(&state, &["laptop"]).with_links(false);
    let p = pipeline(cfg, page, Box::new(FirstTableExtractor::new()), Box::new(rec.clone()));
    let report = p.run_once().await;

    assert_eq!(report.extracted, 0);
    assert_eq!(report.outcome, RunOutcome::NoNewItems);
    assert!(rec.sent.lock().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&state).unwrap(), "");
}

#[tokio::test]
async fn fetch_failure_ends_cycle_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let rec = RecordingNotifier::default();

    let p = TenderPipeline::new(
        config(&state, &["laptop"]),
        Box::new(FixtureFetcher::failing("browser crashed")),
        gem_extractor(),
        Box::new(rec.clone()),
    );
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::FetchFailed);
    assert!(rec.sent.lock().unwrap().is_empty());
    assert_eq!(fs::read_to_string(&state).unwrap(), "");
}

#[tokio::test]
async fn delivery_failure_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let page = gem_page(&[gem_card("GEM/9", "HP laptop", "d")]);

    let p = pipeline(
        config(&state, &["laptop"]),
        &page,
        gem_extractor(),
        Box::new(FailingNotifier),
    );
    let first = p.run_once().await;
    assert_eq!(first.outcome, RunOutcome::NotifyFailed);
    assert_eq!(fs::read_to_string(&state).unwrap(), "GEM/9\n");

    let second = p.run_once().await;
    assert_eq!(second.outcome, RunOutcome::NoNewItems);
}

#[tokio::test]
async fn unreadable_state_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let rec = RecordingNotifier::default();
    // the state path is a directory
    let p = pipeline(
        config(dir.path(), &["laptop"]),
        &gem_page(&[gem_card("GEM/1", "laptop", "d")]),
        gem_extractor(),
        Box::new(rec.clone()),
    );
    assert_eq!(p.run_once().await.outcome, RunOutcome::StoreFailed);
    assert!(rec.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn records_persisted_before_a_write_failure_are_still_mailed() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let page = gem_page(&[
        gem_card("GEM/1", "Dell laptop", "d1"),
        gem_card("GEM/2", "Rack server", "d2"),
        gem_card("GEM/3", "HP laptop", "d3"),
    ]);
    let rec = RecordingNotifier::default();
    let extractor = StateLostMidway {
        inner: BidCardExtractor::new("https://bidplus.gem.gov.in/all-bids"),
        state: state.clone(),
    };

    let p = pipeline(
        config(&state, &["laptop", "server"]),
        &page,
        Box::new(extractor),
        Box::new(rec.clone()),
    );
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::Notified);
    assert!(report.store_failed);
    let nos: Vec<_> = report.accepted.iter().map(|r| r.tender_no.as_str()).collect();
    assert_eq!(nos, vec!["GEM/1"]);

    let sent = rec.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].records.len(), 1);
    assert_eq!(sent[0].records[0].tender_no, "GEM/1");
}

#[tokio::test]
async fn first_write_failure_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_gem.txt");
    let rec = RecordingNotifier::default();
    // GEM/0 is irrelevant, so the swap lands before the only relevant card
    let page = gem_page(&[
        gem_card("GEM/0", "Office chairs", "d0"),
        gem_card("GEM/1", "Dell laptop", "d1"),
    ]);
    let extractor = StateLostMidway {
        inner: BidCardExtractor::new("https://bidplus.gem.gov.in/all-bids"),
        state: state.clone(),
    };

    let p = pipeline(
        config(&state, &["laptop"]),
        &page,
        Box::new(extractor),
        Box::new(rec.clone()),
    );
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::StoreFailed);
    assert!(report.store_failed);
    assert!(report.accepted.is_empty());
    assert!(rec.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn lnmiit_fixture_with_default_keywords() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("processed_lnmiit.txt");
    let rec = RecordingNotifier::default();

    let cfg = tender_watch::sources::lnmiit_config().with_state_path(&state);
    let p = pipeline(
        cfg,
        include_str!("fixtures/lnmiit_tenders.html"),
        Box::new(FirstTableExtractor::new()),
        Box::new(rec.clone()),
    );
    let report = p.run_once().await;

    assert_eq!(report.outcome, RunOutcome::Notified);
    assert_eq!(report.extracted, 4);
    let nos: Vec<_> = report.accepted.iter().map(|r| r.tender_no.as_str()).collect();
    assert_eq!(
        nos,
        vec!["LNMIIT/PUR/2024/031", "LNMIIT/PUR/2024/032", "LNMIIT/PUR/2024/034"]
    );
    let sent = rec.sent.lock().unwrap();
    assert_eq!(
        sent[0].subject(),
        "LNMIIT Tender Alert: 3 New Tenders Found"
    );
    assert!(!sent[0].html_body().contains("Link</th>"));
}
