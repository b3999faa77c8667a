//! Deserialization model for the slice of Stripe webhook events we act on.

use serde::Deserialize;
use std::collections::HashMap;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";
pub const PAYMENT_STATUS_PAID: &str = "paid";

/// Metadata key carrying the comma-joined purchased track ids, set at
/// session-creation time and echoed back by the provider.
pub const TRACK_IDS_METADATA_KEY: &str = "trackIds";

#[derive(Deserialize, Debug)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Deserialize, Debug)]
pub struct EventData {
    pub object: CheckoutSessionObject,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub payment_status: Option<String>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub metadata: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CheckoutSessionObject {
    /// Email collected at checkout, preferring the address the customer
    /// typed into the hosted page over the prefill.
    pub fn purchaser_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .or(self.customer_email.as_deref())
    }

    /// Display name for the delivery email. Checkout rarely collects one.
    pub fn purchaser_name(&self) -> &str {
        self.customer_details
            .as_ref()
            .and_then(|d| d.name.as_deref())
            .unwrap_or("Music Fan")
    }

    pub fn track_ids_metadata(&self) -> Option<&str> {
        self.metadata.get(TRACK_IDS_METADATA_KEY).map(String::as_str)
    }
}
