mod event;
mod stripe;

pub use event::{
    CheckoutSessionObject, CustomerDetails, EventData, WebhookEvent,
    CHECKOUT_SESSION_COMPLETED, PAYMENT_STATUS_PAID,
};
pub use stripe::{verify_signature_at, StripeClient, SIGNATURE_TOLERANCE_SECS};

use async_trait::async_trait;
use thiserror::Error;

/// A checkout session as created by the payment provider. The provider owns
/// the session for its lifetime; nothing is persisted on our side.
#[derive(Debug, Clone)]
pub struct CreatedCheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("No tracks selected")]
    NoTracksSelected,
    #[error("STRIPE_SECRET_KEY is missing")]
    NotConfigured,
    #[error("{0}")]
    Provider(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing stripe-signature header")]
    MissingSignature,
    #[error("STRIPE_WEBHOOK_SECRET is missing")]
    MissingSecret,
    #[error("malformed stripe-signature header")]
    Malformed,
    #[error("timestamp outside tolerance")]
    StaleTimestamp,
    #[error("signature mismatch")]
    Mismatch,
}

/// Seam between the server and the payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for a fixed-price mixtape bundle.
    ///
    /// Every successful call creates billable state at the provider, so
    /// callers must not blindly retry: a repeat produces a second session.
    async fn create_mixtape_session(
        &self,
        track_ids: &[String],
        customer_email: Option<&str>,
    ) -> Result<CreatedCheckoutSession, CheckoutError>;

    /// Verify an inbound webhook payload against its signature header.
    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<(), SignatureError>;
}
