//! WhatsApp alerts to the host, sent through Twilio's Messages API.
//!
//! Delivery is best-effort: [`Notifier::notify`] awaits the attempt but only
//! logs the outcome.

use chrono::{DateTime, Local};
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::TwilioConfig;
use crate::models::VisitorRecord;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("messaging API rejected the request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Skipped,
}

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    api_base: String,
    credentials: Option<TwilioConfig>,
}

impl Notifier {
    pub fn new(api_base: impl Into<String>, credentials: Option<TwilioConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Send the alert for `record`. Returns `Skipped` without touching the
    /// network when credentials are missing.
    pub async fn send(&self, record: &VisitorRecord) -> Result<Delivery, NotifyError> {
        let Some(creds) = &self.credentials else {
            return Ok(Delivery::Skipped);
        };

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, creds.account_sid
        );
        let body = compose_message(record);
        let params = [
            ("To", creds.to.as_str()),
            ("From", creds.from.as_str()),
            ("Body", body.as_str()),
        ];

        let resp = self
            .client
            .post(url)
            .basic_auth(&creds.account_sid, Some(&creds.auth_token))
            .form(&params[..])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { status, body });
        }

        Ok(Delivery::Sent)
    }

    /// Attempt delivery and log the outcome. Failures never reach the caller.
    pub async fn notify(&self, record: &VisitorRecord) {
        match self.send(record).await {
            Ok(Delivery::Sent) => {
                tracing::info!(host = %record.person_to_visit, "WhatsApp notification sent")
            }
            Ok(Delivery::Skipped) => {
                tracing::info!("WhatsApp credentials not configured, notification not sent")
            }
            Err(e) => tracing::error!("Error sending WhatsApp notification: {e}"),
        }
    }
}

pub fn compose_message(record: &VisitorRecord) -> String {
    let photo = if record.photo_path.is_some() {
        "📸 Photo attached"
    } else {
        "📸 No photo provided"
    };

    format!(
        "🚪 *Gate Visitor Alert*\n\
         \n\
         👤 *Visitor:* {}\n\
         📞 *Phone:* {}\n\
         🎯 *Visiting:* {}\n\
         📝 *Purpose:* {}\n\
         ⏰ *Time:* {}\n\
         \n\
         {}\n\
         \n\
         Please respond to allow or deny entry.",
        record.visitor_name,
        record.phone_number,
        record.person_to_visit,
        record.purpose,
        local_time(&record.timestamp),
        photo,
    )
}

/// Render an RFC 3339 timestamp in server-local time, e.g.
/// `5/1/2024, 9:30:00 AM`. Unparseable input is returned unchanged.
fn local_time(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|t| {
            t.with_timezone(&Local)
                .format("%-m/%-d/%Y, %-I:%M:%S %p")
                .to_string()
        })
        .unwrap_or_else(|_| timestamp.to_string())
}
