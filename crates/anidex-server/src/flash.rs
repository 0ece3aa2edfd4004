//! One-shot messages carried across a redirect in a signed cookie.
//!
//! The cookie value is `base64url(json) "." hex(hmac_sha256(key, base64url(json)))`.
//! Cookies with a bad signature or shape are dropped silently.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = "anidex_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Error,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: Category::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: Category::Error,
            message: message.into(),
        }
    }
}

pub fn encode(flash: &Flash, key: &[u8]) -> Option<String> {
    let json = serde_json::to_vec(flash).ok()?;
    let payload = URL_SAFE_NO_PAD.encode(json);
    let signature = sign(key, &payload)?;
    Some(format!("{payload}.{signature}"))
}

pub fn decode(value: &str, key: &[u8]) -> Option<Flash> {
    let (payload, signature) = value.rsplit_once('.')?;
    let expected = hex::decode(signature).ok()?;

    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(payload.as_bytes());
    mac.verify_slice(&expected).ok()?;

    let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&json).ok()
}

/// Attach `flash` to the outgoing response.
pub fn set(jar: CookieJar, key: &[u8], flash: &Flash) -> CookieJar {
    let Some(value) = encode(flash, key) else {
        tracing::warn!("failed to encode flash message");
        return jar;
    };
    jar.add(
        Cookie::build((COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Read the pending flash, if any, and schedule the cookie for removal.
pub fn take(jar: CookieJar, key: &[u8]) -> (CookieJar, Option<Flash>) {
    let Some(value) = jar.get(COOKIE_NAME).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let flash = decode(&value, key);
    if flash.is_none() {
        tracing::debug!("discarding flash cookie with invalid signature");
    }
    let jar = jar.remove(Cookie::build(COOKIE_NAME).path("/"));
    (jar, flash)
}

fn sign(key: &[u8], payload: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"session-key";

    #[test]
    fn signed_value_decodes() {
        let flash = Flash::error("Please enter an anime name.");
        let value = encode(&flash, KEY).unwrap();
        assert_eq!(decode(&value, KEY), Some(flash));
    }

    #[test]
    fn other_key_is_rejected() {
        let value = encode(&Flash::success("ok"), KEY).unwrap();
        assert_eq!(decode(&value, b"other"), None);
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let value = encode(&Flash::success("ok"), KEY).unwrap();
        let (_, sig) = value.rsplit_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(br#"{"category":"success","message":"pwned"}"#);
        assert_eq!(decode(&format!("{forged_payload}.{sig}"), KEY), None);
        assert_eq!(decode("garbage", KEY), None);
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&Flash::success("x")).unwrap();
        assert!(json.contains(r#""category":"success""#));
        assert_eq!(Category::Error.as_str(), "error");
    }

    #[test]
    fn take_clears_cookie() {
        let jar = set(CookieJar::new(), KEY, &Flash::success("Request submitted. Thank you!"));
        assert!(jar.get(COOKIE_NAME).is_some());

        let (jar, flash) = take(jar, KEY);
        assert_eq!(flash.unwrap().message, "Request submitted. Thank you!");
        assert!(jar.get(COOKIE_NAME).is_none());
    }

    #[test]
    fn take_without_cookie_is_noop() {
        let (_, flash) = take(CookieJar::new(), KEY);
        assert!(flash.is_none());
    }

    #[test]
    fn cookie_attributes() {
        let jar = set(CookieJar::new(), KEY, &Flash::success("x"));
        let cookie = jar.get(COOKIE_NAME).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
