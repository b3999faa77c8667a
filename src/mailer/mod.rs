mod resend;

pub use resend::ResendMailer;

use async_trait::async_trait;
use thiserror::Error;

/// One download link line in the mixtape email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("RESEND_API_KEY is missing")]
    NotConfigured,
    #[error("{0}")]
    Provider(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Outbound transactional email. Implementations never retry; the caller
/// decides whether a failure is worth surfacing upstream.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the purchased mixtape's download links to the buyer.
    async fn send_mixtape(
        &self,
        to: &str,
        recipient_name: &str,
        links: &[DownloadLink],
    ) -> Result<(), SendError>;

    /// Relay a contact-form submission to the site inbox.
    async fn send_contact_message(
        &self,
        name: &str,
        reply_to: &str,
        message: &str,
    ) -> Result<(), SendError>;
}
