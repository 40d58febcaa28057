//! `x-line-signature` handling: base64(HMAC-SHA256(channel secret, raw body)).

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Signs `body` the way the platform does. Mostly useful for tests and tooling.
///
/// Returns an empty string if no MAC can be keyed from the secret; an empty
/// signature never verifies.
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let Some(mut mac) = mac_for(channel_secret) else {
        return String::new();
    };
    mac.update(body);
    B64.encode(mac.finalize().into_bytes())
}

/// Constant-time check of a provided signature header against `body`.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(provided) = B64.decode(signature.trim()) else {
        return false;
    };
    let Some(mut mac) = mac_for(channel_secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

fn mac_for(channel_secret: &str) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(channel_secret.as_bytes()).ok()
}
