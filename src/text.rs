// src/text.rs
use once_cell::sync::OnceCell;
use regex::Regex;

/// Normalize scraped cell/anchor text: decode entities, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode (handles &nbsp; left behind by sloppy CMS markup)
    let decoded = html_escape::decode_html_entities(s);

    // 2) Non-breaking spaces count as whitespace
    let out = decoded.replace('\u{00A0}', " ");

    // 3) Collapse whitespace
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static whitespace regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Joins the text nodes of an element and normalizes the result.
pub fn element_text(el: &scraper::ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    normalize_text(&raw)
}
