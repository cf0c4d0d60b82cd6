use crate::challenge::{DeliveryChannel, OTP_CODE_LENGTH};
use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

/// Centralized validation for login inputs
///
/// One canonical implementation of each check, shared by every caller, so the
/// rules cannot drift between endpoints.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Validates an email address
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField(
            "Email is required".to_string(),
        ));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Validates that a password was supplied
///
/// Strength rules apply at registration time, which is outside this crate;
/// at login the only requirement is presence.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::MissingField(
            "Password is required".to_string(),
        ));
    }

    Ok(())
}

/// Parses a delivery channel name, rejecting anything but `email` and `sms`.
pub fn validate_channel(channel: &str) -> Result<DeliveryChannel, ValidationError> {
    if channel.is_empty() {
        return Err(ValidationError::MissingField(
            "Delivery channel is required".to_string(),
        ));
    }

    DeliveryChannel::parse(channel)
        .ok_or_else(|| ValidationError::InvalidChannel(channel.to_string()))
}

/// Validates the shape of a submitted one-time code
///
/// Rejecting malformed codes up front keeps garbage submissions from
/// counting against the challenge's mismatch budget.
pub fn validate_otp_code(code: &str) -> Result<(), ValidationError> {
    if code.is_empty() {
        return Err(ValidationError::MissingField(
            "One-time code is required".to_string(),
        ));
    }

    if code.len() != OTP_CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCodeFormat);
    }

    Ok(())
}
