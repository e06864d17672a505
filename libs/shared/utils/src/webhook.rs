use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed clock skew between the webhook timestamp and now.
const TIMESTAMP_TOLERANCE_SECS: i64 = 300;

/// Verify an identity-provider webhook delivery (svix signing scheme).
///
/// The signed content is `{id}.{timestamp}.{payload}`, HMAC-SHA256 keyed with
/// the base64 secret (the part after the `whsec_` prefix). The signature
/// header may carry several space-separated `v1,<base64>` entries; any match
/// accepts the delivery.
pub fn verify_webhook_signature(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    signature_header: &str,
    payload: &[u8],
) -> Result<(), String> {
    if secret.is_empty() {
        return Err("Webhook secret is not set".to_string());
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| "Invalid webhook timestamp".to_string())?;

    let now = Utc::now().timestamp();
    if (now - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
        debug!("Webhook timestamp {} outside tolerance (now: {})", ts, now);
        return Err("Webhook timestamp outside of tolerance".to_string());
    }

    let key_b64 = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = STANDARD
        .decode(key_b64)
        .map_err(|_| "Invalid webhook secret encoding".to_string())?;

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(message_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let expected = STANDARD.encode(mac.finalize().into_bytes());

    let matches = signature_header
        .split_whitespace()
        .filter_map(|entry| entry.split_once(','))
        .any(|(version, signature)| version == "v1" && signature == expected);

    if !matches {
        debug!("Webhook signature verification failed for message {}", message_id);
        return Err("Invalid webhook signature".to_string());
    }

    Ok(())
}
