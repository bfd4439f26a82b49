// src/types.rs
use serde::{Deserialize, Serialize};

/// One listing row pulled off a portal page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TenderRecord {
    pub tender_no: String,
    pub notification: String,
    pub last_date: String, // display string, never parsed
    pub link: Option<String>,
}

impl TenderRecord {
    pub fn new(
        tender_no: impl Into<String>,
        notification: impl Into<String>,
        last_date: impl Into<String>,
    ) -> Self {
        Self {
            tender_no: tender_no.into(),
            notification: notification.into(),
            last_date: last_date.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
