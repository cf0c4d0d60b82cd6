use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Challenge error: {0}")]
    Challenge(#[from] ChallengeError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Incorrect one-time code")]
    CodeMismatch,

    #[error("Too many incorrect attempts")]
    TooManyAttempts,

    #[error("Insufficient role: {0}")]
    InsufficientRole(String),
}

#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("Challenge not found")]
    NotFound,

    #[error("Challenge expired")]
    Expired,

    #[error("Delivery channel does not match challenge")]
    ChannelMismatch,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Refresh token not found")]
    NotFound,

    #[error("Refresh token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid delivery channel: {0}")]
    InvalidChannel(String),

    #[error("Account has no {0} registered")]
    MissingChannel(String),

    #[error("Invalid one-time code format")]
    InvalidCodeFormat,

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Transport rejected the message: {0}")]
    Transport(String),

    #[error("Delivery timed out after {0} seconds")]
    Timeout(i64),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("JWT signing failed: {0}")]
    JwtSigning(String),

    #[error("JWT verification failed: {0}")]
    JwtVerification(String),
}

impl Error {
    /// Errors caused by the caller's credentials or code, safe to surface as 400/403.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::Auth(AuthError::InvalidCredentials)
                | Error::Auth(AuthError::AccountNotFound)
                | Error::Auth(AuthError::CodeMismatch)
                | Error::Auth(AuthError::TooManyAttempts)
        )
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Retryable by the caller: the challenge was rolled back and issuance can
    /// be attempted again.
    pub fn is_delivery_error(&self) -> bool {
        matches!(self, Error::Delivery(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let auth_error = Error::Auth(AuthError::InvalidCredentials);
        assert_eq!(
            auth_error.to_string(),
            "Authentication error: Invalid credentials"
        );

        let challenge_error = Error::Challenge(ChallengeError::Expired);
        assert_eq!(challenge_error.to_string(), "Challenge error: Challenge expired");

        let delivery_error = Error::Delivery(DeliveryError::Timeout(10));
        assert_eq!(
            delivery_error.to_string(),
            "Delivery error: Delivery timed out after 10 seconds"
        );
    }

    #[test]
    fn test_is_auth_error() {
        assert!(Error::Auth(AuthError::InvalidCredentials).is_auth_error());
        assert!(Error::Auth(AuthError::CodeMismatch).is_auth_error());
        assert!(Error::Auth(AuthError::TooManyAttempts).is_auth_error());
        assert!(!Error::Auth(AuthError::InsufficientRole("user".into())).is_auth_error());
        assert!(!Error::Storage(StorageError::NotFound).is_auth_error());
    }

    #[test]
    fn test_is_delivery_error() {
        assert!(Error::Delivery(DeliveryError::Transport("smtp down".into())).is_delivery_error());
        assert!(!Error::Challenge(ChallengeError::NotFound).is_delivery_error());
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = AuthError::AccountNotFound.into();
        assert!(matches!(error, Error::Auth(AuthError::AccountNotFound)));

        let error: Error = ChallengeError::NotFound.into();
        assert!(matches!(error, Error::Challenge(ChallengeError::NotFound)));

        let error: Error = ValidationError::MissingField("email".into()).into();
        assert!(matches!(error, Error::Validation(ValidationError::MissingField(_))));
    }
}
