use anyhow::Result;
use std::time::{Duration, Instant};

use tracing::info;

use tower_http::services::ServeDir;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::checkout::create_checkout;
use super::contact::submit_contact;
use super::membership_routes::{create_session, get_session};
use super::music::{list_tracks, sign_url};
use super::state::*;
use super::webhook::stripe_webhook;
use super::{log_requests, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub albums: usize,
    pub tracks: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        albums: state.catalog.get_albums_count(),
        tracks: state.catalog.get_tracks_count(),
    };
    Json(stats)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

pub fn make_app(
    config: ServerConfig,
    catalog: GuardedCatalog,
    store: GuardedObjectStore,
    payments: GuardedPaymentGateway,
    mailer: GuardedMailer,
    tier_tokens: GuardedTierTokens,
    albums_prefix: String,
) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        catalog,
        store,
        payments,
        mailer,
        tier_tokens,
        albums_prefix,
        hash: env!("GIT_HASH").to_owned(),
    };

    let shop_routes: Router = Router::new()
        .route("/checkout", post(create_checkout))
        .with_state(state.clone());

    let webhook_routes: Router = Router::new()
        .route("/stripe", post(stripe_webhook))
        .with_state(state.clone());

    let music_routes: Router = Router::new()
        .route("/sign", post(sign_url))
        .route("/tracks", get(list_tracks))
        .with_state(state.clone());

    let membership_routes: Router = Router::new()
        .route("/session", post(create_session))
        .route("/me", get(get_session))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .route("/health", get(health))
        .nest("/v1/shop", shop_routes)
        .nest("/v1/webhooks", webhook_routes)
        .nest("/v1/music", music_routes)
        .nest("/v1/membership", membership_routes)
        .route(
            "/v1/contact",
            post(submit_contact).with_state(state.clone()),
        );

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

#[allow(clippy::too_many_arguments)]
pub async fn run_server(
    catalog: GuardedCatalog,
    store: GuardedObjectStore,
    payments: GuardedPaymentGateway,
    mailer: GuardedMailer,
    tier_tokens: GuardedTierTokens,
    albums_prefix: String,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(
        config,
        catalog,
        store,
        payments,
        mailer,
        tier_tokens,
        albums_prefix,
    )?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Listening on port {}", port);

    Ok(axum::serve(listener, app).await?)
}
