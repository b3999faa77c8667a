//! Membership tiers as a closed, server-validated enum.
//!
//! Tier claims travel in an HMAC-signed expiring token instead of a
//! client-trusted flag; anything the token does not prove falls back to
//! guest access.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Default token lifetime: 30 days.
pub const TIER_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Guest,
    Fan,
    Insider,
    Vip,
    Label,
}

impl Tier {
    pub fn parse(raw: &str) -> Option<Tier> {
        match raw {
            "GUEST" => Some(Tier::Guest),
            "FAN" => Some(Tier::Fan),
            "INSIDER" => Some(Tier::Insider),
            "VIP" => Some(Tier::Vip),
            "LABEL" => Some(Tier::Label),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Guest => "GUEST",
            Tier::Fan => "FAN",
            Tier::Insider => "INSIDER",
            Tier::Vip => "VIP",
            Tier::Label => "LABEL",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Tier::Guest | Tier::Fan => "Fan",
            Tier::Insider => "The Insider",
            Tier::Vip => "Pro Member",
            Tier::Label => "SingIt Pop (Admin)",
        }
    }

    /// High-res (WAV) playback and downloads.
    pub fn has_high_res(self) -> bool {
        matches!(self, Tier::Vip | Tier::Label)
    }

    /// MP3 downloads; every high-res tier has this too.
    pub fn has_mp3_download(self) -> bool {
        self.has_high_res() || matches!(self, Tier::Insider)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Tier::Label)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed tier token")]
    Malformed,
    #[error("tier token expired")]
    Expired,
    #[error("tier token signature mismatch")]
    Mismatch,
}

/// Issues and validates signed tier tokens.
///
/// Token layout: `base64url("{tier}:{expires_unix}") + "." + hex(mac)`,
/// MACed over the decoded payload.
pub struct TierTokens {
    secret: Vec<u8>,
}

impl TierTokens {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            secret: secret.to_vec(),
        }
    }

    /// Generate a service with a random secret. Issued tokens do not
    /// survive a restart; fine for deployments that never set a secret.
    pub fn ephemeral() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            secret: secret.to_vec(),
        }
    }

    pub fn issue(&self, tier: Tier, now: i64) -> String {
        let payload = format!("{}:{}", tier.as_str(), now + TIER_TOKEN_TTL_SECS);
        let mac = self.mac_of(payload.as_bytes());
        format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), hex::encode(mac))
    }

    pub fn validate(&self, token: &str, now: i64) -> Result<Tier, TokenError> {
        let (encoded_payload, mac_hex) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(encoded_payload)
            .map_err(|_| TokenError::Malformed)?;
        let mac = hex::decode(mac_hex).map_err(|_| TokenError::Malformed)?;

        let mut verifier = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| TokenError::Mismatch)?;
        verifier.update(&payload);
        verifier.verify_slice(&mac).map_err(|_| TokenError::Mismatch)?;

        let payload = String::from_utf8(payload).map_err(|_| TokenError::Malformed)?;
        let (tier, expires) = payload.split_once(':').ok_or(TokenError::Malformed)?;
        let expires: i64 = expires.parse().map_err(|_| TokenError::Malformed)?;
        if now >= expires {
            return Err(TokenError::Expired);
        }
        Tier::parse(tier).ok_or(TokenError::Malformed)
    }

    fn mac_of(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any size");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn issue_then_validate_roundtrip() {
        let tokens = TierTokens::new(b"test-secret");
        for tier in [Tier::Guest, Tier::Fan, Tier::Insider, Tier::Vip, Tier::Label] {
            let token = tokens.issue(tier, NOW);
            assert_eq!(tokens.validate(&token, NOW + 10), Ok(tier));
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TierTokens::new(b"test-secret");
        let token = tokens.issue(Tier::Vip, NOW);
        assert_eq!(
            tokens.validate(&token, NOW + TIER_TOKEN_TTL_SECS + 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn tampered_token_is_rejected() {
        let tokens = TierTokens::new(b"test-secret");
        let token = tokens.issue(Tier::Fan, NOW);
        // Swap the payload for a higher tier, keeping the original MAC.
        let mac = token.split_once('.').unwrap().1;
        let forged_payload = URL_SAFE_NO_PAD.encode(format!("LABEL:{}", NOW + TIER_TOKEN_TTL_SECS));
        let forged = format!("{}.{}", forged_payload, mac);
        assert_eq!(tokens.validate(&forged, NOW), Err(TokenError::Mismatch));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let issuer = TierTokens::new(b"secret-a");
        let validator = TierTokens::new(b"secret-b");
        let token = issuer.issue(Tier::Vip, NOW);
        assert_eq!(validator.validate(&token, NOW), Err(TokenError::Mismatch));
    }

    #[test]
    fn garbage_tokens_are_malformed() {
        let tokens = TierTokens::new(b"test-secret");
        for garbage in ["", "no-dot", "a.b", "!!!.ffff"] {
            assert!(tokens.validate(garbage, NOW).is_err());
        }
    }

    #[test]
    fn unknown_tier_strings_do_not_parse() {
        assert_eq!(Tier::parse("VIP"), Some(Tier::Vip));
        assert_eq!(Tier::parse("vip"), None);
        assert_eq!(Tier::parse("PLATINUM"), None);
    }

    #[test]
    fn perks_are_derived_from_the_tier() {
        assert!(!Tier::Guest.has_mp3_download());
        assert!(!Tier::Fan.has_high_res());
        assert!(Tier::Insider.has_mp3_download());
        assert!(!Tier::Insider.has_high_res());
        assert!(Tier::Vip.has_high_res() && Tier::Vip.has_mp3_download());
        assert!(Tier::Label.is_admin());
        assert!(!Tier::Vip.is_admin());
    }
}
