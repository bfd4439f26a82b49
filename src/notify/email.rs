// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header::ContentType, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Delivery, Notifier, TenderDigest};
use crate::config::MailConfig;

/// STARTTLS submission (port 587) with the sender's own credentials.
pub struct EmailNotifier {
    config: MailConfig,
}

impl EmailNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, from: &str, to: &str, digest: &TenderDigest) -> Result<Message> {
        let from: Mailbox = from.parse().context("invalid sender address")?;
        let to: Mailbox = to.parse().context("invalid recipient address")?;
        Message::builder()
            .from(from)
            .to(to)
            .subject(digest.subject())
            .header(ContentType::TEXT_HTML)
            .body(digest.html_body())
            .context("build email")
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, digest: &TenderDigest) -> Result<Delivery> {
        let Some((sender, password, recipient)) = self.config.credentials() else {
            tracing::warn!(
                source = %digest.source_label,
                "email credentials are not set, skipping email"
            );
            return Ok(Delivery::Skipped);
        };

        let msg = self.build_message(sender, recipient, digest)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
            .with_context(|| format!("invalid smtp host {}", self.config.smtp_host))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();

        mailer.send(msg).await.context("send email")?;
        tracing::info!(
            source = %digest.source_label,
            count = digest.records.len(),
            "sent email alert"
        );
        Ok(Delivery::Sent)
    }
}
