//! Delivery: submit the converted book through SendGrid's v3 `mail/send`.
//!
//! The transport sits behind the [`Mailer`] trait so tests and embedders
//! can substitute a double via [`crate::config::HookConfigBuilder::mailer`];
//! the production implementation is [`SendGridClient`].
//!
//! Delivery is deliberately not retried: Readarr re-fires the event on a
//! failed script run, and the already-converted guard turns that re-fire
//! into a cheap skip-or-resend rather than a full reconversion.

use crate::error::HookError;
use crate::pipeline::encode::Attachment;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Default API endpoint; overridable for tests and regional gateways.
pub const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// A fully composed outbound message: one recipient, one attachment.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachment: Attachment,
}

/// Anything that can submit an [`OutboundMessage`].
///
/// Object-safe so [`crate::config::HookConfig`] can hold an
/// `Arc<dyn Mailer>` override.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), HookError>;
}

// ── mail/send request body ───────────────────────────────────────────────

#[derive(Serialize)]
struct MailSendBody<'a> {
    personalizations: [Personalization<'a>; 1],
    from: EmailAddress<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
    attachments: [&'a Attachment; 1],
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [EmailAddress<'a>; 1],
}

#[derive(Serialize)]
struct EmailAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> MailSendBody<'a> {
    fn new(message: &'a OutboundMessage) -> Self {
        Self {
            personalizations: [Personalization {
                to: [EmailAddress { email: &message.to }],
            }],
            from: EmailAddress {
                email: &message.from,
            },
            subject: &message.subject,
            content: [Content {
                content_type: "text/html",
                value: &message.html_body,
            }],
            attachments: [&message.attachment],
        }
    }
}

// ── SendGrid client ──────────────────────────────────────────────────────

/// Thin client for the v3 `mail/send` endpoint.
pub struct SendGridClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SendGridClient {
    /// Build a client with the given key and per-request timeout.
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, HookError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HookError::DeliveryTransport { source: e })?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: SENDGRID_API_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (tests, regional EU host).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl Mailer for SendGridClient {
    async fn send(&self, message: &OutboundMessage) -> Result<(), HookError> {
        let body = MailSendBody::new(message);
        debug!(
            to = %message.to,
            attachment = %message.attachment.filename,
            "submitting mail/send request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| HookError::DeliveryTransport { source: e })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HookError::DeliveryRejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            to = %message.to,
            attachment = %message.attachment.filename,
            status = status.as_u16(),
            "message accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OutboundMessage {
        OutboundMessage {
            from: "hook@example.com".into(),
            to: "reader@kindle.com".into(),
            subject: "Send To Kindle".into(),
            html_body: "Send To Kindle".into(),
            attachment: Attachment {
                content: "QUJD".into(),
                filename: "Foo.mobi".into(),
                mime_type: "application/x-mobipocket-ebook".into(),
                disposition: "attachment".into(),
            },
        }
    }

    #[test]
    fn body_matches_mail_send_shape() {
        let msg = message();
        let json = serde_json::to_value(MailSendBody::new(&msg)).unwrap();

        assert_eq!(
            json["personalizations"][0]["to"][0]["email"],
            "reader@kindle.com"
        );
        assert_eq!(json["from"]["email"], "hook@example.com");
        assert_eq!(json["subject"], "Send To Kindle");
        assert_eq!(json["content"][0]["type"], "text/html");
        assert_eq!(json["content"][0]["value"], "Send To Kindle");
        assert_eq!(json["attachments"][0]["filename"], "Foo.mobi");
        assert_eq!(json["attachments"][0]["content"], "QUJD");
        assert_eq!(json["attachments"][0]["disposition"], "attachment");
    }

    #[test]
    fn body_has_exactly_one_of_everything() {
        let msg = message();
        let json = serde_json::to_value(MailSendBody::new(&msg)).unwrap();
        assert_eq!(json["personalizations"].as_array().unwrap().len(), 1);
        assert_eq!(json["content"].as_array().unwrap().len(), 1);
        assert_eq!(json["attachments"].as_array().unwrap().len(), 1);
    }
}
