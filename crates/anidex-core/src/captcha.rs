//! Proof-of-work CAPTCHA compatible with the ALTCHA widget (SHA-256).
//!
//! The server picks a secret number `n` in `0..=max_number` and publishes
//! `challenge = sha256(salt || n)` together with an HMAC of the challenge.
//! The browser brute-forces `n` and posts it back as a base64-encoded JSON
//! payload. Verification needs no server-side state: the HMAC proves the
//! challenge was issued here, and the salt carries its own expiry.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::Error;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "SHA-256";

const SALT_BYTES: usize = 12;

/// Challenge handed to the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub algorithm: String,
    pub challenge: String,
    pub maxnumber: u64,
    pub salt: String,
    pub signature: String,
}

/// Solution posted back by the widget (base64 JSON in the `altcha` field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub algorithm: String,
    pub challenge: String,
    pub number: u64,
    pub salt: String,
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took: Option<u64>,
}

impl Solution {
    /// Encode the solution the way the widget submits it.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }

    fn decode(payload: &str) -> Option<Self> {
        let json = STANDARD.decode(payload.trim()).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Issue a new challenge signed with `key`.
pub fn create_challenge(
    key: &str,
    max_number: u64,
    expires_in: Option<Duration>,
    now: DateTime<Utc>,
) -> Result<Challenge> {
    if key.is_empty() {
        return Err(Error::Captcha("signing key is empty".into()));
    }

    let mut rng = rand::thread_rng();
    let salt_bytes: [u8; SALT_BYTES] = rng.gen();
    let mut salt = hex::encode(salt_bytes);
    if let Some(ttl) = expires_in {
        salt.push_str(&format!("?expires={}", (now + ttl).timestamp()));
    }
    let number = rng.gen_range(0..=max_number);

    let challenge = hash_challenge(&salt, number);
    let signature = sign(key, &challenge)?;

    Ok(Challenge {
        algorithm: ALGORITHM.to_string(),
        challenge,
        maxnumber: max_number,
        salt,
        signature,
    })
}

/// Check a submitted payload. Any malformed, expired, or forged payload is
/// simply invalid.
pub fn verify_solution(payload: &str, key: &str, now: DateTime<Utc>) -> bool {
    if key.is_empty() {
        return false;
    }
    let Some(solution) = Solution::decode(payload) else {
        return false;
    };

    if solution.algorithm != ALGORITHM {
        return false;
    }
    if salt_expired(&solution.salt, now) {
        return false;
    }
    if hash_challenge(&solution.salt, solution.number) != solution.challenge {
        return false;
    }

    verify_signature(key, &solution.challenge, &solution.signature)
}

/// Brute-force a challenge, as the browser widget does.
pub fn solve(challenge: &Challenge) -> Option<Solution> {
    (0..=challenge.maxnumber)
        .find(|n| hash_challenge(&challenge.salt, *n) == challenge.challenge)
        .map(|number| Solution {
            algorithm: challenge.algorithm.clone(),
            challenge: challenge.challenge.clone(),
            number,
            salt: challenge.salt.clone(),
            signature: challenge.signature.clone(),
            took: None,
        })
}

fn hash_challenge(salt: &str, number: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(number.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn sign(key: &str, challenge: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())
        .map_err(|e| Error::Captcha(format!("invalid signing key: {e}")))?;
    mac.update(challenge.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn verify_signature(key: &str, challenge: &str, signature: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(key.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(challenge.as_bytes());

    let expected_bytes = match hex::decode(signature) {
        Ok(b) => b,
        Err(_) => return false,
    };

    mac.verify_slice(&expected_bytes).is_ok()
}

/// `true` when the salt carries an `expires=<unix secs>` parameter in the past.
fn salt_expired(salt: &str, now: DateTime<Utc>) -> bool {
    let Some((_, params)) = salt.split_once('?') else {
        return false;
    };
    params
        .split('&')
        .filter_map(|pair| pair.strip_prefix("expires="))
        .any(|raw| match raw.parse::<i64>() {
            Ok(expires) => now.timestamp() > expires,
            Err(_) => true,
        })
}
