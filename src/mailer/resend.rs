//! Resend-backed implementation of [`Mailer`].

use super::{DownloadLink, Mailer, SendError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

const RESEND_API_BASE: &str = "https://api.resend.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MIXTAPE_FROM: &str = "SingIt Pop <music@singitpop.com>";
const MIXTAPE_SUBJECT: &str = "Your SingIt Pop Mixtape is Ready!";

pub struct ResendMailer {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    contact_inbox: String,
}

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendMailer {
    /// A `None` api key yields a mailer that logs and reports failure on
    /// every send instead of raising; the request pipeline decides what to
    /// do with that.
    pub fn new(api_key: Option<String>, contact_inbox: String) -> Self {
        if api_key.is_none() {
            warn!("RESEND_API_KEY is missing. Email sending will be skipped.");
        }
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: RESEND_API_BASE.to_string(),
            api_key,
            contact_inbox,
        }
    }

    /// Point the mailer at a different API host. Used by tests.
    #[allow(dead_code)]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    async fn send(
        &self,
        to: &str,
        subject: &str,
        html: String,
        reply_to: Option<&str>,
    ) -> Result<(), SendError> {
        let api_key = self.api_key.as_ref().ok_or(SendError::NotConfigured)?;

        let mut body = json!({
            "from": MIXTAPE_FROM,
            "to": [to],
            "subject": subject,
            "html": html,
        });
        if let Some(reply_to) = reply_to {
            body["reply_to"] = json!([reply_to]);
        }

        let response = self
            .client
            .post(format!("{}/emails", self.api_base))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail: serde_json::Value = response.json().await.unwrap_or_default();
            let message = detail["message"]
                .as_str()
                .unwrap_or("Unknown Resend error")
                .to_string();
            return Err(SendError::Provider(format!("{} ({})", message, status)));
        }

        let sent: SendResponse = response.json().await?;
        info!("Email sent successfully: {}", sent.id);
        Ok(())
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_mixtape(
        &self,
        to: &str,
        recipient_name: &str,
        links: &[DownloadLink],
    ) -> Result<(), SendError> {
        self.send(
            to,
            MIXTAPE_SUBJECT,
            render_mixtape_html(recipient_name, links),
            None,
        )
        .await
    }

    async fn send_contact_message(
        &self,
        name: &str,
        reply_to: &str,
        message: &str,
    ) -> Result<(), SendError> {
        let html = format!(
            "<p><strong>Name:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <p>{}</p>",
            escape_html(name),
            escape_html(reply_to),
            escape_html(message)
        );
        self.send(
            &self.contact_inbox,
            &format!("Contact Form: {}", name),
            html,
            Some(reply_to),
        )
        .await
    }
}

/// Render the mixtape delivery email body.
pub fn render_mixtape_html(recipient_name: &str, links: &[DownloadLink]) -> String {
    let items: String = links
        .iter()
        .map(|link| {
            format!(
                "<li style=\"margin-bottom: 12px;\">\
                 <div style=\"font-weight: bold; margin-bottom: 4px;\">{}</div>\
                 <a href=\"{}\" style=\"color: #7928CA; font-weight: bold;\">Download Track</a>\
                 </li>",
                escape_html(&link.title),
                link.url
            )
        })
        .collect();

    format!(
        "<div style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; color: #333;\">\
         <h1 style=\"color: #FF0080;\">Your Mixtape Has Dropped!</h1>\
         <p>Hi {},</p>\
         <p>Thank you for your purchase from SingIt Pop! Your custom mixtape tracks are ready \
         for download below.</p>\
         <ul style=\"list-style: none; padding: 0;\">{}</ul>\
         <p style=\"color: #666; font-size: 14px;\">Need help? Reply to this email or contact \
         support.</p>\
         </div>",
        escape_html(recipient_name),
        items
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
