//! Bucket/key extraction from S3 object URLs.
//!
//! The catalog stores full object URLs, historically written in both the
//! virtual-hosted style (`https://bucket.s3.region.amazonaws.com/key`) and
//! the path style (`https://s3.region.amazonaws.com/bucket/key`). Keys with
//! reserved characters arrive percent-encoded and must be decoded before
//! they can be re-signed.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUrl {
    pub bucket: String,
    pub key: String,
}

/// Extract `(bucket, key)` from an S3 object URL, percent-decoding the key.
///
/// Returns `None` for anything that is not recognizably an S3 object URL.
pub fn parse_object_url(url: &str) -> Option<ObjectUrl> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;

    let (host, path) = rest.split_once('/')?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    if host.is_empty() || path.is_empty() {
        return None;
    }

    if let Some(bucket) = virtual_hosted_bucket(host) {
        let key = decode_key(path)?;
        return Some(ObjectUrl {
            bucket: bucket.to_string(),
            key,
        });
    }

    if is_path_style_host(host) {
        let (bucket, key_path) = path.split_once('/')?;
        if bucket.is_empty() || key_path.is_empty() {
            return None;
        }
        let key = decode_key(key_path)?;
        return Some(ObjectUrl {
            bucket: bucket.to_string(),
            key,
        });
    }

    None
}

/// `bucket.s3.region.amazonaws.com` or `bucket.s3.amazonaws.com`.
fn virtual_hosted_bucket(host: &str) -> Option<&str> {
    let (bucket, service) = host.split_once(".s3.")?;
    if bucket.is_empty() || !service.ends_with("amazonaws.com") {
        return None;
    }
    Some(bucket)
}

/// `s3.region.amazonaws.com` or `s3.amazonaws.com`.
fn is_path_style_host(host: &str) -> bool {
    host.ends_with("amazonaws.com")
        && (host == "s3.amazonaws.com" || host.strip_prefix("s3.").is_some())
}

fn decode_key(path: &str) -> Option<String> {
    let decoded = urlencoding::decode(path).ok()?.into_owned();
    if decoded.is_empty() {
        return None;
    }
    Some(decoded)
}
