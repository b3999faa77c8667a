//! Signed-URL and track-listing routes.

use super::state::ServerState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::storage::{sign_object_url, SignOutcome, DOWNLOAD_URL_EXPIRY};

#[derive(Deserialize, Debug)]
pub struct SignBody {
    #[serde(default)]
    pub url: Option<String>,
}

/// Exchange a stored-object URL for a one-hour signed URL.
pub async fn sign_url(State(state): State<ServerState>, Json(body): Json<SignBody>) -> Response {
    let url = match body.url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => url,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "URL is required"})),
            )
                .into_response()
        }
    };

    match sign_object_url(state.store.as_ref(), url, DOWNLOAD_URL_EXPIRY, false).await {
        SignOutcome::Signed(signed_url) => Json(json!({"signedUrl": signed_url})).into_response(),
        SignOutcome::UnsignedFallback(_) => {
            // For a paid-download site an unsigned pointer is not an
            // acceptable answer from this endpoint.
            error!("Signing Error for url: {}", url);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to sign URL"})),
            )
                .into_response()
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ListedTrack {
    id: usize,
    title: String,
    duration: String,
    plays: String,
    locked: bool,
    price: f64,
    genre: String,
    audio_url: String,
    high_res_url: String,
    mp3_download_url: String,
    download_url: String,
}

/// Enumerate audio objects under the albums prefix, with parallel signed
/// streaming and download URLs per track.
pub async fn list_tracks(State(state): State<ServerState>) -> Response {
    let keys = match state.store.list_keys(&state.albums_prefix).await {
        Ok(keys) => keys,
        Err(err) => {
            error!("Error fetching tracks from storage: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to fetch tracks"})),
            )
                .into_response();
        }
    };

    let audio_keys: Vec<String> = keys
        .into_iter()
        .filter(|key| key.ends_with(".mp3") || key.ends_with(".wav"))
        .collect();

    let tracks: Vec<ListedTrack> =
        futures::future::join_all(audio_keys.iter().enumerate().map(|(index, key)| {
            let store = state.store.clone();
            async move {
                let filename = key.rsplit('/').next().unwrap_or(key.as_str());
                let title = filename
                    .trim_end_matches(".mp3")
                    .trim_end_matches(".wav")
                    .to_string();
                let is_wav = key.ends_with(".wav");

                // Key-based signing: a failure yields an empty URL, which
                // the frontend treats as "not available".
                let (stream_url, download_url) = futures::join!(
                    store.presign_get(key, DOWNLOAD_URL_EXPIRY, false),
                    store.presign_get(key, DOWNLOAD_URL_EXPIRY, true),
                );
                let stream_url = stream_url.unwrap_or_default();
                let download_url = download_url.unwrap_or_default();

                ListedTrack {
                    id: index + 1,
                    title,
                    duration: "0:00".to_string(),
                    plays: "100K".to_string(),
                    locked: false,
                    price: 0.99,
                    genre: "Pop".to_string(),
                    audio_url: stream_url.clone(),
                    high_res_url: if is_wav { stream_url } else { String::new() },
                    mp3_download_url: if is_wav {
                        String::new()
                    } else {
                        download_url.clone()
                    },
                    download_url,
                }
            }
        }))
        .await;

    Json(json!({"tracks": tracks})).into_response()
}
