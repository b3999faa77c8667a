//! Contact-form-to-email bridge.

use super::state::GuardedMailer;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::LazyLock;
use tracing::error;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex, this should never happen")
});

#[derive(Deserialize, Debug)]
pub struct ContactBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

pub async fn submit_contact(
    State(mailer): State<GuardedMailer>,
    Json(body): Json<ContactBody>,
) -> Response {
    if body.name.trim().is_empty() || body.email.trim().is_empty() || body.message.trim().is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "All fields are required"})),
        )
            .into_response();
    }

    if !EMAIL_REGEX.is_match(&body.email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid email address"})),
        )
            .into_response();
    }

    match mailer
        .send_contact_message(&body.name, &body.email, &body.message)
        .await
    {
        Ok(()) => Json(json!({
            "success": true,
            "message": "Message received! We'll get back to you soon."
        }))
        .into_response(),
        Err(err) => {
            error!("Contact form error: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to send message. Please try again."})),
            )
                .into_response()
        }
    }
}
