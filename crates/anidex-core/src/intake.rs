//! Title-request and feedback intake.
//!
//! Both forms run the same pipeline and differ only in field name, length
//! bounds, and wording:
//!
//! 1. verify the CAPTCHA solution
//! 2. enforce the hourly, then the daily, per-IP cap
//! 3. validate the trimmed text
//! 4. append the record to the form's document
//!
//! The first failing step produces a [`Rejection`]. Rejections are user-facing
//! outcomes, not errors; only persistence failures surface as [`Error`].

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::captcha::{self, Challenge};
use crate::config::{CaptchaConfig, Config};
use crate::error::Result;
use crate::ratelimit::{LimitExceeded, RateLimits};
use crate::records::{format_timestamp, FeedbackRecord, RequestRecord};
use crate::store::RecordStore;
use crate::Error;

/// Which intake form a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntakeKind {
    Request,
    Feedback,
}

impl IntakeKind {
    /// Form field (and record key) holding the submitted text.
    pub fn field(self) -> &'static str {
        match self {
            IntakeKind::Request => "title",
            IntakeKind::Feedback => "feedback",
        }
    }

    /// Minimum length in characters, after trimming.
    pub fn min_chars(self) -> usize {
        match self {
            IntakeKind::Request => 1,
            IntakeKind::Feedback => 10,
        }
    }

    /// Maximum length in characters, after trimming.
    pub fn max_chars(self) -> usize {
        match self {
            IntakeKind::Request => 100,
            IntakeKind::Feedback => 500,
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            IntakeKind::Request => "Request submitted. Thank you!",
            IntakeKind::Feedback => "Feedback submitted. Thank you!",
        }
    }
}

impl fmt::Display for IntakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeKind::Request => f.write_str("request"),
            IntakeKind::Feedback => f.write_str("feedback"),
        }
    }
}

/// Why a submission was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Captcha,
    Limit(IntakeKind, LimitExceeded),
    Empty(IntakeKind),
    TooShort(IntakeKind),
    TooLong(IntakeKind),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use IntakeKind::*;
        use LimitExceeded::*;

        let msg = match self {
            Rejection::Captcha => "Please complete the security verification.",
            Rejection::Limit(Request, Hourly) => "You have reached the maximum requests per hour.",
            Rejection::Limit(Request, Daily) => "You have reached the maximum requests per day.",
            Rejection::Limit(Feedback, Hourly) => {
                "You have reached the maximum feedback submissions per hour."
            }
            Rejection::Limit(Feedback, Daily) => {
                "You have reached the maximum feedback submissions per day."
            }
            Rejection::Empty(Request) => "Please enter an anime name.",
            Rejection::Empty(Feedback) => "Please enter your feedback.",
            Rejection::TooShort(Request) => "Please enter an anime name.",
            Rejection::TooShort(Feedback) => "Feedback must be at least 10 characters long.",
            Rejection::TooLong(Request) => "Anime name must be no more than 100 characters long.",
            Rejection::TooLong(Feedback) => "Feedback must be no more than 500 characters long.",
        };
        f.write_str(msg)
    }
}

/// Raw form fields as posted.
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub text: Option<String>,
    pub altcha: Option<String>,
}

/// A record of either form, serialized as its inner shape.
#[derive(Serialize)]
#[serde(untagged)]
enum NewRecord {
    Request(RequestRecord),
    Feedback(FeedbackRecord),
}

/// Result of a processed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted { count: usize },
    Rejected(Rejection),
}

/// Trim and bound-check submitted text.
pub fn validate_text(kind: IntakeKind, raw: Option<&str>) -> std::result::Result<String, Rejection> {
    let text = raw.unwrap_or_default().trim();
    let len = text.chars().count();

    if len == 0 {
        Err(Rejection::Empty(kind))
    } else if len < kind.min_chars() {
        Err(Rejection::TooShort(kind))
    } else if len > kind.max_chars() {
        Err(Rejection::TooLong(kind))
    } else {
        Ok(text.to_string())
    }
}

/// Runs the intake pipeline against the two record documents.
///
/// All methods do blocking file I/O; async callers should run them on a
/// blocking thread.
#[derive(Debug)]
pub struct IntakeService {
    requests: RecordStore,
    feedbacks: RecordStore,
    captcha_key: Option<String>,
    captcha: CaptchaConfig,
    limits: RateLimits,
}

impl IntakeService {
    pub fn new(config: &Config) -> Self {
        Self {
            requests: RecordStore::new(config.requests_path()),
            feedbacks: RecordStore::new(config.feedbacks_path()),
            captcha_key: config.secrets.captcha_key.clone(),
            captcha: config.captcha.clone(),
            limits: config.limits.into(),
        }
    }

    /// The document a form appends to.
    pub fn store(&self, kind: IntakeKind) -> &RecordStore {
        match kind {
            IntakeKind::Request => &self.requests,
            IntakeKind::Feedback => &self.feedbacks,
        }
    }

    /// Issue a fresh challenge for a form page.
    pub fn challenge(&self, now: DateTime<Utc>) -> Result<Challenge> {
        let key = self
            .captcha_key
            .as_deref()
            .ok_or_else(|| Error::Captcha("no captcha key configured".into()))?;
        let ttl = (self.captcha.expires_secs > 0)
            .then(|| Duration::seconds(self.captcha.expires_secs as i64));
        captcha::create_challenge(key, self.captcha.max_number, ttl, now)
    }

    /// Process one submission from `ip`.
    pub fn submit(
        &self,
        kind: IntakeKind,
        ip: &str,
        form: &IntakeForm,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let verified = match (form.altcha.as_deref(), self.captcha_key.as_deref()) {
            (Some(payload), Some(key)) if !payload.is_empty() => {
                captcha::verify_solution(payload, key, now)
            }
            _ => false,
        };
        if !verified {
            tracing::debug!(%kind, ip, "captcha verification failed");
            return Ok(Outcome::Rejected(Rejection::Captcha));
        }

        let timestamp = format_timestamp(now);
        let decision = self.store(kind).append_with(|existing| {
            if let Err(limit) = self.limits.check(existing, ip, now) {
                return Err(Rejection::Limit(kind, limit));
            }
            let text = validate_text(kind, form.text.as_deref())?;
            Ok(match kind {
                IntakeKind::Request => NewRecord::Request(RequestRecord {
                    title: text,
                    ip: ip.to_string(),
                    timestamp,
                }),
                IntakeKind::Feedback => NewRecord::Feedback(FeedbackRecord {
                    feedback: text,
                    ip: ip.to_string(),
                    timestamp,
                }),
            })
        })?;

        let count = match decision {
            Ok(count) => count,
            Err(rejection @ Rejection::Limit(..)) => {
                tracing::info!(%kind, ip, ?rejection, "submission rate limited");
                return Ok(Outcome::Rejected(rejection));
            }
            Err(rejection) => {
                tracing::debug!(%kind, ip, ?rejection, "submission failed validation");
                return Ok(Outcome::Rejected(rejection));
            }
        };

        tracing::info!(%kind, ip, count, "submission stored");
        Ok(Outcome::Accepted { count })
    }
}
