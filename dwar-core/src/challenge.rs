//! One-time-code challenges
//!
//! An [`OtpChallenge`] represents one in-flight login attempt between the
//! password check and code verification. The challenge is keyed by an
//! unguessable handle returned to the caller; the code itself only ever
//! travels out-of-band through the delivery channel.
//!
//! Challenges are single-use: the first successful verification consumes the
//! record, as does expiry or exhausting the mismatch budget.

use chrono::{DateTime, Duration, Utc};
use rand::{TryRngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};

use crate::id::{generate_prefixed_id, validate_prefixed_id};

/// Number of digits in a generated one-time code.
pub const OTP_CODE_LENGTH: usize = 6;

/// Generate a random numeric one-time code of [`OTP_CODE_LENGTH`] digits.
pub fn generate_otp_code() -> String {
    let n = OsRng.try_next_u32().unwrap() % 1_000_000;
    format!("{n:06}")
}

/// The opaque session-in-progress handle for a challenge
///
/// Handles carry at least 96 bits of entropy, so possession of a handle is
/// proof of having started the login attempt it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChallengeId(String);

impl ChallengeId {
    pub fn new(id: &str) -> Self {
        ChallengeId(id.to_string())
    }

    pub fn new_random() -> Self {
        ChallengeId(generate_prefixed_id("chl"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "chl")
    }
}

impl Default for ChallengeId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for ChallengeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChallengeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ChallengeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The out-of-band channel a one-time code is delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Email,
    Sms,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryChannel::Email => "email",
            DeliveryChannel::Sms => "sms",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(DeliveryChannel::Email),
            "sms" => Some(DeliveryChannel::Sms),
            _ => None,
        }
    }

    /// Human name of the account field backing this channel.
    pub fn field_name(&self) -> &'static str {
        match self {
            DeliveryChannel::Email => "email",
            DeliveryChannel::Sms => "phone number",
        }
    }
}

impl std::fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One in-flight one-time-code challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// The unguessable handle this challenge is keyed by.
    pub id: ChallengeId,

    /// The channel value the code was sent to (email address or phone number).
    pub identifier: String,

    /// The channel the code was dispatched through.
    pub channel: DeliveryChannel,

    /// The code value; never returned to the caller.
    pub code: String,

    /// Number of incorrect codes submitted against this challenge so far.
    pub failed_attempts: u32,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Create a fresh challenge with a random handle and code.
    pub fn new(identifier: impl Into<String>, channel: DeliveryChannel, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: ChallengeId::new_random(),
            identifier: identifier.into(),
            channel,
            code: generate_otp_code(),
            failed_attempts: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
