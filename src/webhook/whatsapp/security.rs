//! Security utilities for WhatsApp webhook verification
//!
//! Meta signs every webhook delivery with HMAC-SHA256 using the app secret.
//! The signature travels in the `X-Hub-Signature-256` header with the format
//! `sha256=<hex_signature>` and is computed over the raw request body, so it
//! must be checked before the body is parsed.
//!
//! [`SignedBody`] is the extractor the webhook receiver takes as its body: a
//! handler asking for it never runs for an unsigned or tampered request.

use crate::{consts, errors::WebhookError, webhook::AppState};
use hmac::{Hmac, Mac};
use ntex::{http::Payload, util::Bytes, web};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

fn compute_signature(payload: &[u8], app_secret: &str) -> Option<Vec<u8>> {
    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return None;
        }
    };

    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Header value Meta would send for `payload`, e.g. `sha256=ab12...`
pub fn sign_payload(payload: &[u8], app_secret: &str) -> Option<String> {
    compute_signature(payload, app_secret)
        .map(|signature| format!("{}{}", consts::SIGNATURE_PREFIX, hex::encode(signature)))
}

/// Verifies the X-Hub-Signature-256 header against the request payload
///
/// # Arguments
///
/// * `signature_header` - The value of the X-Hub-Signature-256 header (e.g., "sha256=abc123...")
/// * `payload` - The raw request body bytes
/// * `app_secret` - Your WhatsApp/Facebook app secret
///
/// # Returns
///
/// * `true` if the signature is valid
/// * `false` if the signature is invalid or the header format is incorrect
pub fn verify_signature(signature_header: &str, payload: &[u8], app_secret: &str) -> bool {
    let Some(signature_hex) = signature_header.strip_prefix(consts::SIGNATURE_PREFIX) else {
        logfire::warn!("Invalid signature header format: expected 'sha256=' prefix");
        return false;
    };

    let expected_signature = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::warn!(
                "Failed to decode signature hex: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    let Some(computed_signature) = compute_signature(payload, app_secret) else {
        return false;
    };

    // constant time, lengths are compared first
    let is_valid: bool = computed_signature.ct_eq(&expected_signature).into();

    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}

/// Raw request body whose signature has been verified
#[derive(Debug)]
pub struct SignedBody(pub Bytes);

impl<Err: web::ErrorRenderer> web::FromRequest<Err> for SignedBody {
    type Error = web::Error;

    async fn from_request(req: &web::HttpRequest, payload: &mut Payload) -> Result<Self, Self::Error> {
        let app_secret = req
            .app_state::<AppState>()
            .and_then(|state| state.config.app_secret.clone())
            .ok_or_else(|| WebhookError::Internal("App secret not configured".into()))?;

        let signature_header = req
            .headers()
            .get(consts::SIGNATURE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let Some(signature_header) = signature_header else {
            logfire::warn!("Missing X-Hub-Signature-256 header");
            return Err(WebhookError::InvalidSignature.into());
        };

        let body = <Bytes as web::FromRequest<Err>>::from_request(req, payload)
            .await
            .map_err(|e| WebhookError::InvalidPayload(format!("Failed to read body: {e}")))?;

        if !verify_signature(&signature_header, &body, &app_secret) {
            return Err(WebhookError::InvalidSignature.into());
        }

        Ok(SignedBody(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";
    const PAYLOAD: &[u8] = b"{\"object\":\"whatsapp_business_account\"}";

    #[test]
    fn test_verify_signature_valid() {
        let header = sign_payload(PAYLOAD, SECRET).unwrap();

        assert!(header.starts_with("sha256="));
        assert!(verify_signature(&header, PAYLOAD, SECRET));
    }

    #[test]
    fn test_verify_signature_rejects_other_secret_or_payload() {
        let header = sign_payload(PAYLOAD, "wrong_secret").unwrap();
        assert!(!verify_signature(&header, PAYLOAD, SECRET));

        let header = sign_payload(PAYLOAD, SECRET).unwrap();
        assert!(!verify_signature(&header, b"{\"object\":\"tampered\"}", SECRET));
    }

    #[test]
    fn test_verify_signature_rejects_bad_headers() {
        let valid = sign_payload(PAYLOAD, SECRET).unwrap();
        let bare_hex = valid.trim_start_matches("sha256=");

        assert!(!verify_signature(bare_hex, PAYLOAD, SECRET));
        assert!(!verify_signature(&format!("sha1={bare_hex}"), PAYLOAD, SECRET));
        assert!(!verify_signature("sha256=zzzzz", PAYLOAD, SECRET));
        assert!(!verify_signature("sha256=", PAYLOAD, SECRET));
        assert!(!verify_signature(
            &format!("sha256={}", &bare_hex[..32]),
            PAYLOAD,
            SECRET
        ));
    }
}
