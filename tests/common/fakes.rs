//! Recording fakes for the external seams.

use async_trait::async_trait;
use singitpop_club_server::mailer::{DownloadLink, Mailer, SendError};
use singitpop_club_server::payments::{
    verify_signature_at, CheckoutError, CreatedCheckoutSession, PaymentGateway, SignatureError,
};
use singitpop_club_server::storage::ObjectStore;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mailer
// ============================================================================

#[derive(Debug, Clone)]
pub struct SentMixtape {
    pub to: String,
    pub recipient_name: String,
    pub links: Vec<DownloadLink>,
}

pub struct RecordingMailer {
    fail: bool,
    pub mixtapes: Mutex<Vec<SentMixtape>>,
    pub contact_messages: Mutex<Vec<(String, String, String)>>,
}

#[allow(dead_code)] // Each test binary uses its own slice of the harness.
impl RecordingMailer {
    pub fn new(fail: bool) -> Self {
        Self {
            fail,
            mixtapes: Mutex::new(Vec::new()),
            contact_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_mixtapes(&self) -> Vec<SentMixtape> {
        self.mixtapes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_mixtape(
        &self,
        to: &str,
        recipient_name: &str,
        links: &[DownloadLink],
    ) -> Result<(), SendError> {
        if self.fail {
            return Err(SendError::Provider("simulated outage".to_string()));
        }
        self.mixtapes.lock().unwrap().push(SentMixtape {
            to: to.to_string(),
            recipient_name: recipient_name.to_string(),
            links: links.to_vec(),
        });
        Ok(())
    }

    async fn send_contact_message(
        &self,
        name: &str,
        reply_to: &str,
        message: &str,
    ) -> Result<(), SendError> {
        if self.fail {
            return Err(SendError::Provider("simulated outage".to_string()));
        }
        self.contact_messages.lock().unwrap().push((
            name.to_string(),
            reply_to.to_string(),
            message.to_string(),
        ));
        Ok(())
    }
}

// ============================================================================
// Object store
// ============================================================================

pub struct FakeObjectStore {
    bucket: String,
    fail_signing: bool,
    pub listed_keys: Mutex<Vec<String>>,
    pub moves: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)] // Each test binary uses its own slice of the harness.
impl FakeObjectStore {
    pub fn new(bucket: &str, fail_signing: bool) -> Self {
        Self {
            bucket: bucket.to_string(),
            fail_signing,
            listed_keys: Mutex::new(Vec::new()),
            moves: Mutex::new(Vec::new()),
        }
    }

    pub fn set_keys(&self, keys: &[&str]) {
        *self.listed_keys.lock().unwrap() = keys.iter().map(|k| k.to_string()).collect();
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        as_attachment: bool,
    ) -> anyhow::Result<String> {
        if self.fail_signing {
            anyhow::bail!("signing unavailable");
        }
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let disposition = if as_attachment {
            "&response-content-disposition=attachment"
        } else {
            ""
        };
        Ok(format!(
            "https://{}.s3.eu-north-1.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature=testsig{}",
            self.bucket,
            encoded_key,
            expires_in.as_secs(),
            disposition
        ))
    }

    async fn list_keys(&self, prefix: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .listed_keys
            .lock()
            .unwrap()
            .iter()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn move_object(&self, from: &str, to: &str) -> anyhow::Result<()> {
        self.moves
            .lock()
            .unwrap()
            .push((from.to_string(), to.to_string()));
        Ok(())
    }
}

// ============================================================================
// Payment gateway
// ============================================================================

pub struct FakeGateway {
    webhook_secret: String,
    fail_create: bool,
    pub created_sessions: Mutex<Vec<Vec<String>>>,
}

#[allow(dead_code)] // Each test binary uses its own slice of the harness.
impl FakeGateway {
    pub fn new(webhook_secret: &str, fail_create: bool) -> Self {
        Self {
            webhook_secret: webhook_secret.to_string(),
            fail_create,
            created_sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn created_count(&self) -> usize {
        self.created_sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_mixtape_session(
        &self,
        track_ids: &[String],
        _customer_email: Option<&str>,
    ) -> Result<CreatedCheckoutSession, CheckoutError> {
        if track_ids.is_empty() {
            return Err(CheckoutError::NoTracksSelected);
        }
        if self.fail_create {
            return Err(CheckoutError::Provider(
                "Invalid API Key provided".to_string(),
            ));
        }
        self.created_sessions
            .lock()
            .unwrap()
            .push(track_ids.to_vec());
        Ok(CreatedCheckoutSession {
            id: "cs_test_123".to_string(),
            url: "https://checkout.stripe.com/c/pay/cs_test_123".to_string(),
        })
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> Result<(), SignatureError> {
        let header = signature_header.ok_or(SignatureError::MissingSignature)?;
        verify_signature_at(
            payload,
            header,
            &self.webhook_secret,
            chrono::Utc::now().timestamp(),
        )
    }
}
