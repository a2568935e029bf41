//! Slack request signature verification
//!
//! Slack signs every request with `v0=hex(HMAC-SHA256(secret, "v0:{timestamp}:{body}"))`
//! and sends it in `X-Slack-Signature` alongside `X-Slack-Request-Timestamp`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme version prefix
const VERSION: &str = "v0";

/// Requests older (or newer) than this are rejected as replays
pub const MAX_REQUEST_AGE_SECS: i64 = 300;

/// Why a request failed verification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("missing signature headers")]
    Missing,

    #[error("malformed signature or timestamp")]
    Malformed,

    #[error("request timestamp outside the allowed window")]
    Stale,

    #[error("signature mismatch")]
    Mismatch,
}

fn keyed_mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Malformed)?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Compute the `v0=...` signature for a request body
pub fn compute_signature(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let mac = keyed_mac(secret, timestamp, body)?;
    Ok(format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify a signed request
///
/// `now_unix` is the current Unix time in seconds.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now_unix: i64,
) -> Result<(), SignatureError> {
    if timestamp.is_empty() || signature.is_empty() {
        return Err(SignatureError::Missing);
    }

    let sent_at: i64 = timestamp.trim().parse().map_err(|_| SignatureError::Malformed)?;
    if (now_unix - sent_at).abs() > MAX_REQUEST_AGE_SECS {
        return Err(SignatureError::Stale);
    }

    let digest = signature
        .strip_prefix(VERSION)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(digest).map_err(|_| SignatureError::Malformed)?;

    // verify_slice compares in constant time
    keyed_mac(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}
