//! Minimal HS256 JWT signer for Kling authentication.
//!
//! Kling expects a short-lived bearer token signed with the account's secret
//! key: issuer = access key, 30-minute expiry, valid from 5 seconds in the
//! past to tolerate clock skew.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use ring::hmac;
use serde_json::json;

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 1800;

/// Clock-skew allowance in seconds.
const NOT_BEFORE_SKEW_SECS: i64 = 5;

/// Signs a token valid from now.
pub fn sign(access_key: &str, secret_key: &str) -> String {
    sign_at(access_key, secret_key, Utc::now().timestamp())
}

/// Signs a token for a fixed issue time. Split out for testability.
pub fn sign_at(access_key: &str, secret_key: &str, now: i64) -> String {
    let header = json!({"alg": "HS256", "typ": "JWT"});
    let payload = json!({
        "iss": access_key,
        "exp": now + TOKEN_TTL_SECS,
        "nbf": now - NOT_BEFORE_SKEW_SECS,
    });

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    );

    let key = hmac::Key::new(hmac::HMAC_SHA256, secret_key.as_bytes());
    let signature = hmac::sign(&key, signing_input.as_bytes());

    format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature.as_ref()))
}
