// src/notify/mod.rs
pub mod email;

pub use email::EmailNotifier;

use anyhow::Result;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::types::TenderRecord;

const TH: &str = r#"<th style="padding: 8px; text-align: left;">"#;
const TD: &str = r#"<td style="padding: 8px;">"#;

/// One email's worth of newly accepted tenders from a single source.
#[derive(Debug, Clone)]
pub struct TenderDigest {
    pub source_label: String,
    pub records: Vec<TenderRecord>,
    pub show_links: bool,
    pub checked_at: DateTime<Utc>,
}

impl TenderDigest {
    pub fn new(source_label: &str, records: Vec<TenderRecord>, show_links: bool) -> Self {
        Self {
            source_label: source_label.to_string(),
            records,
            show_links,
            checked_at: Utc::now(),
        }
    }

    pub fn subject(&self) -> String {
        format!(
            "{} Tender Alert: {} New Tenders Found",
            self.source_label,
            self.records.len()
        )
    }

    pub fn html_body(&self) -> String {
        let mut html = format!(
            "<html><body><p>The following new tenders were found on the {} website:</p>",
            encode_text(&self.source_label)
        );
        html.push_str(r#"<table border="1" style="border-collapse: collapse; width: 100%;">"#);

        html.push_str("<tr>");
        for h in ["Tender No.", "Notification", "Last Date"] {
            html.push_str(&format!("{TH}{h}</th>"));
        }
        if self.show_links {
            html.push_str(&format!("{TH}Link</th>"));
        }
        html.push_str("</tr>");

        for r in &self.records {
            html.push_str("<tr>");
            for cell in [&r.tender_no, &r.notification, &r.last_date] {
                html.push_str(&format!("{TD}{}</td>", encode_text(cell)));
            }
            if self.show_links {
                let link = match &r.link {
                    Some(url) => format!(
                        r#"<a href="{}">View</a>"#,
                        encode_double_quoted_attribute(url)
                    ),
                    None => "-".to_string(),
                };
                html.push_str(&format!("{TD}{link}</td>"));
            }
            html.push_str("</tr>");
        }

        html.push_str("</table>");
        html.push_str(&format!(
            "<p style=\"color: #888; font-size: 12px;\">Checked at {}</p>",
            self.checked_at.format("%Y-%m-%d %H:%M UTC")
        ));
        html.push_str("</body></html>");
        html
    }
}

/// What happened to a digest handed to a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Channel not configured; nothing was attempted.
    Skipped,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, digest: &TenderDigest) -> Result<Delivery>;
}
