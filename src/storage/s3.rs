//! S3-backed implementation of [`ObjectStore`].

use super::ObjectStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

pub struct S3MusicStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3MusicStore {
    /// Build a store against the given region/bucket, resolving credentials
    /// through the SDK's default chain (environment, profile, instance role).
    pub async fn new(region: &str, bucket: &str) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.to_string(),
        }
    }

    pub fn from_client(client: aws_sdk_s3::Client, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3MusicStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
        as_attachment: bool,
    ) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .context("Invalid presigning expiry")?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_response_content_disposition(
                as_attachment.then(|| "attachment".to_string()),
            )
            .presigned(presigning)
            .await
            .with_context(|| format!("Failed to presign GET for key \"{}\"", key))?;

        Ok(request.uri().to_string())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to list objects under \"{}\"", prefix))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            match response.next_continuation_token() {
                Some(token) => continuation_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn move_object(&self, from: &str, to: &str) -> Result<()> {
        // CopySource wants "bucket/key" with each key segment URL-encoded.
        let source_key = from
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(format!("{}/{}", self.bucket, source_key))
            .key(to)
            .send()
            .await
            .with_context(|| format!("Failed to copy \"{}\" to \"{}\"", from, to))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(from)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Copied \"{}\" to \"{}\" but failed to delete the original",
                    from, to
                )
            })?;

        Ok(())
    }
}
