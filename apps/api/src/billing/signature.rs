//! `Stripe-Signature` verification: `t=<unix>,v1=<hex hmac>[,v1=...]`,
//! HMAC-SHA256 over `"{t}.{raw body}"` keyed by the endpoint secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum accepted age (either direction) of the signed timestamp.
pub const TOLERANCE_SECS: u64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("No signatures found matching the expected signature for payload")]
    NoMatch,

    #[error("Unable to extract timestamp and signatures from header")]
    Malformed,

    #[error("Missing Stripe-Signature header")]
    MissingHeader,

    #[error("Timestamp outside the tolerance zone")]
    StaleTimestamp,
}

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Some(mac)
}

/// Hex signature for `payload` signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Option<String> {
    mac_for(secret, timestamp, payload).map(|mac| hex::encode(mac.finalize().into_bytes()))
}

/// Checks `header` against `payload`. Any one matching `v1` entry is enough.
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let header = header.ok_or(SignatureError::MissingHeader)?;

    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if now.abs_diff(timestamp) > TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let matched = candidates.iter().any(|candidate| {
        match (hex::decode(candidate), mac_for(secret, timestamp, payload)) {
            (Ok(bytes), Some(mac)) => mac.verify_slice(&bytes).is_ok(),
            _ => false,
        }
    });
    if matched {
        Ok(())
    } else {
        Err(SignatureError::NoMatch)
    }
}
