//! Webhook signature verification.
//!
//! LINE signs every webhook body with HMAC-SHA256 keyed by the channel secret
//! and sends the base64 digest in the `X-Line-Signature` header.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{BotError, Result};

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, body: &[u8]) -> Result<HmacSha256> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| BotError::InvalidSignature)?;
    mac.update(body);
    Ok(mac)
}

/// Computes the base64 signature of `body` under `secret`.
///
/// # Errors
///
/// Returns `BotError::InvalidSignature` if the secret cannot key the MAC.
pub fn sign(secret: &str, body: &[u8]) -> Result<String> {
    let mac = mac_for(secret, body)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verifies `signature` against `body` in constant time.
///
/// # Errors
///
/// Returns `BotError::InvalidSignature` if the signature is not valid base64
/// or does not match.
pub fn verify(secret: &str, body: &[u8], signature: &str) -> Result<()> {
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| BotError::InvalidSignature)?;
    mac_for(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| BotError::InvalidSignature)
}
