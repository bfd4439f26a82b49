// src/extract/bid_cards.rs
//! GeM "all bids" page: one `div.bid_card` per bid, newest first.

use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::{selector, TenderExtractor};
use crate::text::{element_text, normalize_text};
use crate::types::TenderRecord;

/// Newest-first listing, so the head of the page is all a run needs.
pub const DEFAULT_MAX_CARDS: usize = 15;

static CARD: Lazy<Selector> = Lazy::new(|| selector("div.bid_card"));
static BID_LINK: Lazy<Selector> = Lazy::new(|| selector("p.bid_no a"));
static ITEMS: Lazy<Selector> = Lazy::new(|| selector("div.col-md-4 a"));
static END_DATE: Lazy<Selector> = Lazy::new(|| selector("span.end_date"));

pub struct BidCardExtractor {
    base_url: Option<Url>,
    max_cards: usize,
}

impl BidCardExtractor {
    pub fn new(page_url: &str) -> Self {
        Self {
            base_url: Url::parse(page_url).ok(),
            max_cards: DEFAULT_MAX_CARDS,
        }
    }

    pub fn with_max_cards(mut self, n: usize) -> Self {
        self.max_cards = n;
        self
    }

    fn parse_card(&self, card: ElementRef<'_>) -> Option<TenderRecord> {
        let anchor = card.select(&BID_LINK).next();
        let tender_no = anchor.map(|a| element_text(&a)).filter(|s| !s.is_empty());
        let link = anchor
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| self.resolve(href));

        // The visible anchor text is truncated; the full item list sits in data-content.
        let notification = card
            .select(&ITEMS)
            .next()
            .map(|a| match a.value().attr("data-content") {
                Some(full) => normalize_text(full),
                None => element_text(&a),
            })
            .filter(|s| !s.is_empty());

        let last_date = card
            .select(&END_DATE)
            .next()
            .map(|e| element_text(&e))
            .filter(|s| !s.is_empty());

        match (tender_no, notification, last_date) {
            (Some(tender_no), Some(notification), Some(last_date)) => Some(TenderRecord {
                tender_no,
                notification,
                last_date,
                link,
            }),
            (no, notification, date) => {
                tracing::debug!(
                    has_no = no.is_some(),
                    has_notification = notification.is_some(),
                    has_date = date.is_some(),
                    "skipping incomplete bid card"
                );
                None
            }
        }
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }
        match &self.base_url {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        }
        .map(|u| u.to_string())
    }
}

impl TenderExtractor for BidCardExtractor {
    fn extract<'a>(&'a self, doc: &'a Html) -> Box<dyn Iterator<Item = TenderRecord> + 'a> {
        tracing::info!(
            cards = doc.select(&CARD).count(),
            cap = self.max_cards,
            "bid cards on page"
        );
        Box::new(
            doc.select(&CARD)
                .take(self.max_cards)
                .filter_map(move |card| self.parse_card(card)),
        )
    }

    fn name(&self) -> &'static str {
        "bid_cards"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(no: &str, href: &str, items: &str, end: &str) -> String {
        format!(
            r#"<div class="card bid_card">
                 <p class="bid_no pull-left">BID NO:
                   <a class="bid_no_hover" href="{href}">{no}</a></p>
                 <div class="card-body"><div class="col-md-4"><div class="row">
                   <strong>Items:</strong> <a data-content="{items}">{items}</a>
                 </div></div>
                 <div class="col-md-3"><div class="row"><strong>End Date:</strong>
                   <span class="end_date">{end}</span></div></div></div>
               </div>"#
        )
    }

    fn page(cards: &[String]) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", cards.join("\n")))
    }

    #[test]
    fn parses_fields_and_resolves_relative_link() {
        let doc = page(&[card(
            "GEM/2024/B/1",
            "/showbidDocument/1",
            "Dell Laptop",
            "10-01-2024 15:00:00",
        )]);
        let ex = BidCardExtractor::new("https://bidplus.gem.gov.in/all-bids");
        let out: Vec<_> = ex.extract(&doc).collect();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].tender_no, "GEM/2024/B/1");
        assert_eq!(out[0].notification, "Dell Laptop");
        assert_eq!(out[0].last_date, "10-01-2024 15:00:00");
        assert_eq!(
            out[0].link.as_deref(),
            Some("https://bidplus.gem.gov.in/showbidDocument/1")
        );
    }

    #[test]
    fn caps_at_max_cards() {
        let cards: Vec<String> = (0..20)
            .map(|i| card(&format!("GEM/{i}"), "/b", "Server", "01-01-2025"))
            .collect();
        let doc = page(&cards);

        let ex = BidCardExtractor::new("https://bidplus.gem.gov.in/all-bids");
        assert_eq!(ex.extract(&doc).count(), DEFAULT_MAX_CARDS);

        let ex = ex.with_max_cards(3);
        let nos: Vec<_> = ex.extract(&doc).map(|r| r.tender_no).collect();
        assert_eq!(nos, vec!["GEM/0", "GEM/1", "GEM/2"]);
    }

    #[test]
    fn incomplete_card_is_skipped_not_fatal() {
        let broken =
            r#"<div class="bid_card"><p class="bid_no"><a href="/x">GEM/BAD</a></p></div>"#;
        let doc = page(&[
            card("GEM/A", "/a", "HP Switch", "02-02-2025"),
            broken.to_string(),
            card("GEM/B", "", "Lenovo Server", "03-02-2025"),
        ]);
        let ex = BidCardExtractor::new("https://bidplus.gem.gov.in/all-bids");
        let out: Vec<_> = ex.extract(&doc).collect();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].tender_no, "GEM/A");
        assert_eq!(out[1].tender_no, "GEM/B");
        // empty href leaves the card usable without a link
        assert!(out[1].link.is_none());
    }
}
