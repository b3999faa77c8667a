//! Mixtape checkout route.

use super::state::GuardedPaymentGateway;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::payments::CheckoutError;

#[derive(Deserialize, Debug)]
pub struct CheckoutBody {
    #[serde(default)]
    pub tracks: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
}

pub async fn create_checkout(
    State(payments): State<GuardedPaymentGateway>,
    Json(body): Json<CheckoutBody>,
) -> Response {
    if body.tracks.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No tracks selected"})),
        )
            .into_response();
    }

    match payments
        .create_mixtape_session(&body.tracks, body.email.as_deref())
        .await
    {
        Ok(session) => Json(json!({"sessionId": session.id, "url": session.url})).into_response(),
        Err(CheckoutError::NoTracksSelected) => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No tracks selected"})),
        )
            .into_response(),
        Err(err) => {
            error!("Stripe Error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": err.to_string()})),
            )
                .into_response()
        }
    }
}
