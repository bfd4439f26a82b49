// src/extract/first_table.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::{selector, TenderExtractor};
use crate::text::element_text;
use crate::types::TenderRecord;

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

/// Server-rendered tender table: header row, then
/// `| # | notification | tender no | last date | ... |`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstTableExtractor;

impl FirstTableExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn parse_row(row: ElementRef<'_>) -> Option<TenderRecord> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL).collect();
    if cells.len() < 4 {
        tracing::debug!(cells = cells.len(), "skipping short table row");
        return None;
    }
    let tender_no = element_text(&cells[2]);
    if tender_no.is_empty() {
        tracing::debug!("skipping row without tender number");
        return None;
    }
    Some(TenderRecord {
        tender_no,
        notification: element_text(&cells[1]),
        last_date: element_text(&cells[3]),
        link: None,
    })
}

impl TenderExtractor for FirstTableExtractor {
    fn extract<'a>(&'a self, doc: &'a Html) -> Box<dyn Iterator<Item = TenderRecord> + 'a> {
        let Some(table) = doc.select(&TABLE).next() else {
            tracing::warn!("could not find table on page");
            return Box::new(std::iter::empty());
        };
        Box::new(table.select(&ROW).skip(1).filter_map(parse_row))
    }

    fn name(&self) -> &'static str {
        "first_table"
    }
}
