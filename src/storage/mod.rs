mod object_url;
mod s3;

pub use object_url::{parse_object_url, ObjectUrl};
pub use s3::S3MusicStore;

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Fixed lifetime of download links handed out to purchasers.
pub const DOWNLOAD_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// Interface to the music bucket.
///
/// Implemented by [`S3MusicStore`] in production and by in-memory fakes in
/// tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// The bucket this store is bound to.
    fn bucket(&self) -> &str;

    /// Produce a time-limited signed GET URL for `key`, optionally forcing
    /// attachment disposition so browsers download instead of play inline.
    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        as_attachment: bool,
    ) -> Result<String>;

    /// List every object key under `prefix`, following pagination
    /// sequentially until exhausted.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Move an object by copying it to `to` and then deleting `from`.
    ///
    /// If the delete fails the copy is left in place; callers get both keys
    /// and a human cleans up. There is no rollback.
    async fn move_object(&self, from: &str, to: &str) -> Result<()>;
}

/// Outcome of signing a stored-object URL.
///
/// Signing never raises towards fulfillment; a failure degrades to the
/// original unsigned reference, and the variant forces callers to decide
/// whether a raw storage pointer is acceptable where they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    Signed(String),
    UnsignedFallback(String),
}

impl SignOutcome {
    pub fn into_url(self) -> String {
        match self {
            SignOutcome::Signed(url) | SignOutcome::UnsignedFallback(url) => url,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, SignOutcome::Signed(_))
    }
}

/// Sign a full storage URL (virtual-hosted or path style).
///
/// Unparseable URLs, URLs pointing at a different bucket, and signing
/// failures all degrade to [`SignOutcome::UnsignedFallback`] carrying the
/// input unchanged.
pub async fn sign_object_url(
    store: &dyn ObjectStore,
    url: &str,
    expires_in: Duration,
    as_attachment: bool,
) -> SignOutcome {
    let parsed = match parse_object_url(url) {
        Some(parsed) => parsed,
        None => {
            warn!("Could not extract bucket/key from \"{}\"", url);
            return SignOutcome::UnsignedFallback(url.to_string());
        }
    };

    if parsed.bucket != store.bucket() {
        warn!(
            "URL bucket \"{}\" does not match configured bucket \"{}\"",
            parsed.bucket,
            store.bucket()
        );
        return SignOutcome::UnsignedFallback(url.to_string());
    }

    match store.presign_get(&parsed.key, expires_in, as_attachment).await {
        Ok(signed) => SignOutcome::Signed(signed),
        Err(err) => {
            warn!("Error generating signed URL for key \"{}\": {}", parsed.key, err);
            SignOutcome::UnsignedFallback(url.to_string())
        }
    }
}
