//! Membership tier session routes.
//!
//! The tier is a server-validated claim in a signed token, not a
//! client-trusted flag; perks are derived here and nowhere else.

use super::state::GuardedTierTokens;
use axum::{
    body::Body,
    extract::State,
    http::{header, response, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::membership::Tier;

pub const TIER_COOKIE: &str = "tier_token";

#[derive(Deserialize, Debug)]
pub struct CreateSessionBody {
    #[serde(default)]
    pub tier: String,
}

pub async fn create_session(
    State(tokens): State<GuardedTierTokens>,
    Json(body): Json<CreateSessionBody>,
) -> Response {
    let tier = match Tier::parse(&body.tier) {
        Some(tier) => tier,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Unknown tier"})),
            )
                .into_response()
        }
    };

    let token = tokens.issue(tier, chrono::Utc::now().timestamp());
    let response_body = json!({
        "token": token,
        "tier": tier.as_str(),
        "name": tier.display_name(),
    });

    let cookie_value = HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly",
        TIER_COOKIE, token
    ))
    .expect("tier tokens are always valid header values");

    response::Builder::new()
        .status(StatusCode::CREATED)
        .header(header::SET_COOKIE, cookie_value)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(response_body.to_string()))
        .unwrap()
}

pub async fn get_session(
    State(tokens): State<GuardedTierTokens>,
    jar: CookieJar,
    headers: axum::http::HeaderMap,
) -> Response {
    let token = jar
        .get(TIER_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(&headers));

    let token = match token {
        Some(token) => token,
        None => return StatusCode::UNAUTHORIZED.into_response(),
    };

    match tokens.validate(&token, chrono::Utc::now().timestamp()) {
        Ok(tier) => Json(json!({
            "tier": tier.as_str(),
            "name": tier.display_name(),
            "highRes": tier.has_high_res(),
            "mp3Download": tier.has_mp3_download(),
            "admin": tier.is_admin(),
        }))
        .into_response(),
        Err(err) => {
            debug!("Rejecting tier token: {}", err);
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

fn bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
