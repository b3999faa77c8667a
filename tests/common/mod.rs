//! Common test infrastructure
//!
//! Builds an in-process app with recording fakes behind every external
//! seam (payments, storage, email), so tests drive the real router and
//! pipeline without any network.

mod fakes;
mod fixtures;

#[allow(unused_imports)]
pub use fakes::{FakeGateway, FakeObjectStore, RecordingMailer, SentMixtape};
#[allow(unused_imports)]
pub use fixtures::{test_albums, TEST_BUCKET, WEBHOOK_SECRET};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use singitpop_club_server::catalog::Catalog;
use singitpop_club_server::membership::TierTokens;
use singitpop_club_server::server::server::make_app;
use singitpop_club_server::server::{RequestsLoggingLevel, ServerConfig};
use std::sync::Arc;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub mailer: Arc<RecordingMailer>,
    pub gateway: Arc<FakeGateway>,
    pub store: Arc<FakeObjectStore>,
    pub tier_tokens: Arc<TierTokens>,
}

#[allow(dead_code)] // Each test binary uses its own slice of the harness.
impl TestApp {
    pub fn spawn() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// POST a webhook payload with a valid signature over `WEBHOOK_SECRET`.
    pub async fn post_signed_webhook(&self, payload: &serde_json::Value) -> Response<Body> {
        let bytes = serde_json::to_vec(payload).unwrap();
        let header = signature_header(&bytes, WEBHOOK_SECRET, chrono::Utc::now().timestamp());
        self.post_webhook_raw(bytes, Some(&header)).await
    }

    pub async fn post_webhook_raw(
        &self,
        payload: Vec<u8>,
        signature_header: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/webhooks/stripe")
            .header("content-type", "application/json");
        if let Some(header) = signature_header {
            builder = builder.header("stripe-signature", header);
        }
        self.request(builder.body(Body::from(payload)).unwrap()).await
    }
}

#[derive(Default)]
pub struct TestAppBuilder {
    failing_mailer: bool,
    failing_signing: bool,
    failing_gateway: bool,
}

#[allow(dead_code)] // Each test binary uses its own slice of the harness.
impl TestAppBuilder {
    pub fn with_failing_mailer(mut self) -> Self {
        self.failing_mailer = true;
        self
    }

    pub fn with_failing_signing(mut self) -> Self {
        self.failing_signing = true;
        self
    }

    pub fn with_failing_gateway(mut self) -> Self {
        self.failing_gateway = true;
        self
    }

    pub fn build(self) -> TestApp {
        let catalog = Catalog::build(test_albums())
            .catalog
            .expect("test catalog should build");

        let mailer = Arc::new(RecordingMailer::new(self.failing_mailer));
        let gateway = Arc::new(FakeGateway::new(WEBHOOK_SECRET, self.failing_gateway));
        let store = Arc::new(FakeObjectStore::new(TEST_BUCKET, self.failing_signing));
        let tier_tokens = Arc::new(TierTokens::new(b"test-membership-secret"));

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };

        let app = make_app(
            config,
            Arc::new(catalog),
            store.clone(),
            gateway.clone(),
            mailer.clone(),
            tier_tokens.clone(),
            "albums/".to_string(),
        )
        .expect("test app should build");

        TestApp {
            app,
            mailer,
            gateway,
            store,
            tier_tokens,
        }
    }
}

/// Compute a Stripe-style `t=...,v1=...` signature header.
#[allow(dead_code)]
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    format!(
        "t={},v1={}",
        timestamp,
        hex::encode(mac.finalize().into_bytes())
    )
}

/// A paid checkout.session.completed event with the given track ids.
#[allow(dead_code)]
pub fn paid_session_event(track_ids: &str, email: &str) -> serde_json::Value {
    json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_123",
                "payment_status": "paid",
                "customer_details": {"email": email, "name": "Jo"},
                "metadata": {"trackIds": track_ids, "type": "mixtape_purchase"}
            }
        }
    })
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
