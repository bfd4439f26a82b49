// src/extract/mod.rs
pub mod bid_cards;
pub mod first_table;

pub use bid_cards::{BidCardExtractor, DEFAULT_MAX_CARDS};
pub use first_table::FirstTableExtractor;

use scraper::{Html, Selector};

use crate::types::TenderRecord;

/// Turns a parsed listing page into tender records.
///
/// The returned iterator is lazy and single-pass; malformed entries are
/// skipped inside it rather than ending the batch.
pub trait TenderExtractor: Send + Sync {
    fn extract<'a>(&'a self, doc: &'a Html) -> Box<dyn Iterator<Item = TenderRecord> + 'a>;
    fn name(&self) -> &'static str;
}

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static css selector")
}
