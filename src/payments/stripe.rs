//! Stripe checkout client and webhook signature verification.

use super::{CheckoutError, CreatedCheckoutSession, PaymentGateway, SignatureError};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use tracing::error;

const STRIPE_API_BASE: &str = "https://api.stripe.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Flat bundle price in pence, regardless of how many tracks are in the
/// mixtape. Deliberate simplification carried over from the shop.
const MIXTAPE_UNIT_AMOUNT_PENCE: u32 = 100;

const MIXTAPE_PRODUCT_NAME: &str = "SingIt Pop - Custom Mixtape";
const MIXTAPE_PRODUCT_IMAGE: &str =
    "https://club.singitpop.com/images/icons/music-note-clean.png";

/// Maximum accepted age of a webhook signature timestamp.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
    webhook_secret: Option<String>,
    site_base_url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

impl StripeClient {
    pub fn new(
        secret_key: Option<String>,
        webhook_secret: Option<String>,
        site_base_url: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base: STRIPE_API_BASE.to_string(),
            secret_key,
            webhook_secret,
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Point the client at a different API host. Used by tests.
    #[allow(dead_code)]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_mixtape_session(
        &self,
        track_ids: &[String],
        customer_email: Option<&str>,
    ) -> Result<CreatedCheckoutSession, CheckoutError> {
        if track_ids.is_empty() {
            return Err(CheckoutError::NoTracksSelected);
        }
        let secret_key = self
            .secret_key
            .as_ref()
            .ok_or(CheckoutError::NotConfigured)?;

        let params = mixtape_session_params(track_ids, customer_email, &self.site_base_url);
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("Unknown Stripe error")
                .to_string();
            error!("Stripe session creation failed ({}): {}", status, message);
            return Err(CheckoutError::Provider(message));
        }

        let session: SessionResponse = response.json().await?;
        Ok(CreatedCheckoutSession {
            id: session.id,
            url: session.url,
        })
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<(), SignatureError> {
        let header = signature_header.ok_or(SignatureError::MissingSignature)?;
        let secret = self
            .webhook_secret
            .as_deref()
            .ok_or(SignatureError::MissingSecret)?;
        verify_signature_at(payload, header, secret, chrono::Utc::now().timestamp())
    }
}

/// Verify a Stripe `t=<ts>,v1=<hex>` signature header against the payload.
///
/// The signed message is `"{timestamp}.{payload}"`, MACed with HMAC-SHA256
/// over the endpoint secret. Timestamps further than
/// [`SIGNATURE_TOLERANCE_SECS`] from `now` are rejected to blunt replays.
pub fn verify_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signature: Option<Vec<u8>> = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::Malformed)?);
            }
            Some(("v1", value)) => {
                signature = Some(hex::decode(value).map_err(|_| SignatureError::Mismatch)?);
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    let signature = signature.ok_or(SignatureError::Malformed)?;

    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Mismatch)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.verify_slice(&signature)
        .map_err(|_| SignatureError::Mismatch)
}

fn mixtape_session_params(
    track_ids: &[String],
    customer_email: Option<&str>,
    site_base_url: &str,
) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("payment_method_types[0]".into(), "card".into()),
        (
            "line_items[0][price_data][currency]".into(),
            "gbp".into(),
        ),
        (
            "line_items[0][price_data][product_data][name]".into(),
            MIXTAPE_PRODUCT_NAME.into(),
        ),
        (
            "line_items[0][price_data][product_data][description]".into(),
            format!("{} tracks selected", track_ids.len()),
        ),
        (
            "line_items[0][price_data][product_data][images][0]".into(),
            MIXTAPE_PRODUCT_IMAGE.into(),
        ),
        (
            "line_items[0][price_data][unit_amount]".into(),
            MIXTAPE_UNIT_AMOUNT_PENCE.to_string(),
        ),
        ("line_items[0][quantity]".into(), "1".into()),
        ("mode".into(), "payment".into()),
        (
            "success_url".into(),
            format!(
                "{}/music/checkout?success=true&customer_email={}",
                site_base_url,
                urlencoding::encode(customer_email.unwrap_or_default())
            ),
        ),
        (
            "cancel_url".into(),
            format!("{}/music/checkout?canceled=true", site_base_url),
        ),
        ("metadata[trackIds]".into(), track_ids.join(",")),
        ("metadata[type]".into(), "mixtape_purchase".into()),
    ];

    if let Some(email) = customer_email {
        params.push(("customer_email".into(), email.to_string()));
    }

    params
}
