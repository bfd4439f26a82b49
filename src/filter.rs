// src/filter.rs
use std::collections::HashSet;

use crate::store::TenderStore;
use crate::types::TenderRecord;

/// Case-insensitive substring match against lowercase keywords.
pub fn matches_any(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    /// Records persisted to the store in this pass, in extraction order.
    pub accepted: Vec<TenderRecord>,
    pub already_seen: usize,
    pub irrelevant: usize,
    /// Set when an append failed; the pass stopped at that record.
    pub store_error: Option<anyhow::Error>,
}

/// Keep unseen, relevant records in extraction order.
///
/// Each accepted tender number is appended to `store` before the next record
/// is looked at, so an interrupted run never re-notifies what it already
/// accepted. A failed append stops the pass but keeps everything accepted
/// before it: those ids are on disk and must still be notified. The record
/// whose append failed is left out and comes round again next run.
pub fn select_new<I>(
    records: I,
    processed: &mut HashSet<String>,
    keywords: &[String],
    store: &TenderStore,
) -> FilterOutcome
where
    I: IntoIterator<Item = TenderRecord>,
{
    let mut out = FilterOutcome::default();
    for rec in records {
        if processed.contains(&rec.tender_no) {
            out.already_seen += 1;
            continue;
        }
        if !matches_any(&rec.notification, keywords) {
            out.irrelevant += 1;
            continue;
        }
        if let Err(e) = store.append(&rec.tender_no) {
            out.store_error = Some(e.context(format!("recording {}", rec.tender_no)));
            break;
        }
        processed.insert(rec.tender_no.clone());
        tracing::info!(tender_no = %rec.tender_no, "found new tender");
        out.accepted.push(rec);
    }
    out
}
