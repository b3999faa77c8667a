//! Stripe payment webhook endpoint.
//!
//! Everything past signature verification assumes a verified event. A
//! delivery failure answers 500 so the provider's retry mechanism
//! redelivers; anything permanently undeliverable is acknowledged to stop
//! redelivery loops.

use super::state::ServerState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::fulfillment::{fulfill_paid_session, FulfillmentStatus};
use crate::payments::{WebhookEvent, CHECKOUT_SESSION_COMPLETED, PAYMENT_STATUS_PAID};

pub async fn stripe_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok());

    if let Err(err) = state.payments.verify_webhook_signature(&body, signature) {
        warn!("Webhook signature verification failed: {}", err);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("Webhook Error: {}", err)})),
        )
            .into_response();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Could not parse webhook payload: {}", err);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Webhook Error: unparseable payload"})),
            )
                .into_response();
        }
    };

    if event.event_type == CHECKOUT_SESSION_COMPLETED {
        let session = event.data.object;
        info!("Payment succeeded for session: {}", session.id);

        if session.payment_status.as_deref() == Some(PAYMENT_STATUS_PAID) {
            match fulfill_paid_session(
                state.catalog.as_ref(),
                state.store.as_ref(),
                state.mailer.as_ref(),
                &session,
            )
            .await
            {
                Ok(FulfillmentStatus::Delivered { .. })
                | Ok(FulfillmentStatus::NothingToDeliver) => {}
                Err(err) => {
                    error!("Failed to send mixtape email: {}", err);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "Email send failed"})),
                    )
                        .into_response();
                }
            }
        }
    }

    Json(json!({"received": true})).into_response()
}
