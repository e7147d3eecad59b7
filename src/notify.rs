//! Delivery of the market report by email

use crate::core::Report;
use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, report: &Report) -> Result<()>;
}

/// Sends each report as one plain text mail over implicit TLS. No queueing, no retry.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
    receiver: String,
}

impl SmtpNotifier {
    /// Must be called from within a Tokio runtime; the pooled transport spawns onto it.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let secrets = &config.secrets;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp.host)
            .with_context(|| format!("Failed to configure SMTP relay {}", config.smtp.host))?
            .port(config.smtp.port)
            .credentials(Credentials::new(
                secrets.email_sender.clone(),
                secrets.email_password.clone(),
            ))
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(SmtpNotifier {
            transport,
            sender: secrets.email_sender.clone(),
            receiver: secrets.email_receiver.clone(),
        })
    }

    fn build_message(&self, report: &Report) -> Result<Message> {
        let from: Mailbox = self
            .sender
            .parse()
            .with_context(|| format!("Invalid sender address: {}", self.sender))?;
        let to: Mailbox = self
            .receiver
            .parse()
            .with_context(|| format!("Invalid recipient address: {}", self.receiver))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(&report.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(report.body.clone())
            .context("Failed to build email")
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, report: &Report) -> Result<()> {
        let message = self.build_message(report)?;
        debug!(to = %self.receiver, "Sending report email");

        self.transport
            .send(message)
            .await
            .context("SMTP delivery failed")?;
        info!("Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SmtpConfig;

    fn config(vars: &'static [(&'static str, &'static str)]) -> AppConfig {
        let mut config = AppConfig::from_lookup(
            |key: &str| {
                vars.iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
            },
            None,
        )
        .unwrap();
        config.smtp = SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
        };
        config
    }

    fn report() -> Report {
        Report {
            subject: "Market Update — Gold, Currency, and Crypto".to_string(),
            body: "Gold (24k/gram): 4500.0 EGP\nUSD → EGP: 49.5".to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_message_headers() {
        let notifier = SmtpNotifier::new(&config(&[
            ("EMAIL_SENDER", "tracker@example.com"),
            ("EMAIL_RECEIVER", "me@example.com"),
        ]))
        .unwrap();

        let message = notifier.build_message(&report()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: tracker@example.com"));
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_placeholder_sender_fails_before_connecting() {
        let notifier = SmtpNotifier::new(&config(&[("EMAIL_RECEIVER", "me@example.com")])).unwrap();

        let err = notifier.send(&report()).await.unwrap_err();
        assert!(err.to_string().contains("Invalid sender address"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        let notifier = SmtpNotifier::new(&config(&[
            ("EMAIL_SENDER", "tracker@example.com"),
            ("EMAIL_RECEIVER", "me@example.com"),
        ]))
        .unwrap();

        let err = notifier.send(&report()).await.unwrap_err();
        assert!(err.to_string().contains("SMTP delivery failed"));
    }
}
