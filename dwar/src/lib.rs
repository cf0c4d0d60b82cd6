//! # Dwar
//!
//! Dwar is the authentication library behind the Hello Samaj civic portal.
//! It implements a two-step login: primary credentials buy a short-lived
//! one-time code delivered out-of-band, and verifying that code buys a
//! session token pair (a JWT access token and an opaque refresh token).
//!
//! Storage is pluggable through the repository traits in [`dwar_core`], and
//! code delivery through the [`OtpDelivery`] trait, so the same flow runs
//! against an in-memory store with file-based delivery in development and a
//! shared store with a real SMS/email gateway in production.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use dwar::{Dwar, JwtConfig, DeliveryChannel};
//! use dwar::FileDelivery;
//! use dwar_storage_memory::MemoryRepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let repositories = Arc::new(MemoryRepositoryProvider::new());
//!     let delivery = FileDelivery::new("/tmp/dwar-otp").unwrap();
//!     let jwt = JwtConfig::new_hs256(b"change-me-to-a-real-secret".to_vec());
//!
//!     let dwar = Dwar::new(repositories, Box::new(delivery), jwt);
//!
//!     let challenge = dwar
//!         .send_otp("asha@example.com", "secret", DeliveryChannel::Email)
//!         .await;
//! }
//! ```

use std::sync::Arc;

use dwar_core::{
    error::{AuthError, ChallengeError},
    repositories::{
        AccountRepository, AccountRepositoryAdapter, AccountRepositoryProvider,
        ChallengeRepositoryAdapter, PasswordRepository, PasswordRepositoryProvider,
        PasswordRepositoryAdapter, RepositoryProvider,
    },
    services::{OtpService, SessionService},
};

/// Re-export core types
///
/// These types are commonly used when working with the Dwar API.
pub use dwar_core::{
    AccessClaims, Account, AccountId, ChallengeId, DeliveryChannel, JwtAlgorithm, JwtConfig,
    RefreshToken, Role, SessionPair,
    account::{AccountProfile, NewAccount},
    services::{ChallengeHandle, FileDelivery, OtpConfig, OtpDelivery, SessionConfig},
};

/// Re-export storage backends
#[cfg(feature = "memory")]
pub use dwar_storage_memory::MemoryRepositoryProvider;

/// Errors surfaced by the Dwar API
///
/// Core errors are flattened into caller-facing categories here; the variant
/// tells an HTTP layer which status family to render, and the message is safe
/// to show to the caller.
#[derive(Debug, thiserror::Error)]
pub enum DwarError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Wrong password, wrong code, or attempt budget exhausted
    #[error("{0}")]
    Auth(String),

    /// Account lacks the role the operation requires
    #[error("{0}")]
    Forbidden(String),

    /// Unknown handle, account, or token
    #[error("{0}")]
    NotFound(String),

    /// Code or token past its window
    #[error("{0}")]
    Expired(String),

    /// Missing or unverifiable session token
    #[error("{0}")]
    Unauthorized(String),

    /// Outbound code dispatch failed; the attempt was rolled back and may be
    /// retried
    #[error("{0}")]
    Delivery(String),

    /// Storage or signing failure
    #[error("Internal error")]
    Internal(String),
}

impl From<dwar_core::Error> for DwarError {
    fn from(e: dwar_core::Error) -> Self {
        use dwar_core::Error;
        match &e {
            Error::Validation(_) => DwarError::Validation(e.to_string()),
            Error::Auth(AuthError::InsufficientRole(_)) => DwarError::Forbidden(e.to_string()),
            Error::Auth(AuthError::AccountNotFound) => DwarError::NotFound(e.to_string()),
            Error::Auth(_) => DwarError::Auth(e.to_string()),
            Error::Challenge(ChallengeError::NotFound) => DwarError::NotFound(e.to_string()),
            Error::Challenge(ChallengeError::Expired) => DwarError::Expired(e.to_string()),
            Error::Challenge(ChallengeError::ChannelMismatch) => {
                DwarError::Validation(e.to_string())
            }
            Error::Session(_) => DwarError::Unauthorized(e.to_string()),
            Error::Delivery(_) => DwarError::Delivery(e.to_string()),
            Error::Storage(_) | Error::Crypto(_) => DwarError::Internal(e.to_string()),
        }
    }
}

/// The main coordinator for the two-step login flow.
///
/// `Dwar` wires the OTP and session services over a repository provider and a
/// delivery transport, and exposes the operations an HTTP layer needs.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use dwar::{Dwar, JwtConfig, FileDelivery};
/// use dwar_storage_memory::MemoryRepositoryProvider;
///
/// #[tokio::main]
/// async fn main() {
///     let repositories = Arc::new(MemoryRepositoryProvider::new());
///     let delivery = Box::new(FileDelivery::new("/tmp/dwar-otp").unwrap());
///     let jwt = JwtConfig::new_hs256(b"change-me-to-a-real-secret".to_vec());
///
///     let dwar = Dwar::new(repositories, delivery, jwt);
/// }
/// ```
pub struct Dwar<R: RepositoryProvider> {
    repositories: Arc<R>,
    delivery: Arc<Box<dyn OtpDelivery>>,
    otp_service: OtpService<
        AccountRepositoryAdapter<R>,
        PasswordRepositoryAdapter<R>,
        ChallengeRepositoryAdapter<R>,
        Box<dyn OtpDelivery>,
    >,
    session_service: SessionService<AccountRepositoryAdapter<R>>,
}

impl<R: RepositoryProvider> Dwar<R> {
    /// Create a new Dwar instance with default OTP and session policies
    ///
    /// # Arguments
    ///
    /// * `repositories` - The repository provider implementation
    /// * `delivery` - Transport for dispatching one-time codes
    /// * `jwt` - Signing configuration for access tokens
    pub fn new(repositories: Arc<R>, delivery: Box<dyn OtpDelivery>, jwt: JwtConfig) -> Self {
        let delivery = Arc::new(delivery);
        let otp_service = Self::build_otp_service(&repositories, &delivery, OtpConfig::default());
        let session_service = SessionService::new(
            Arc::new(AccountRepositoryAdapter::new(repositories.clone())),
            SessionConfig::new(jwt),
        );

        Self {
            repositories,
            delivery,
            otp_service,
            session_service,
        }
    }

    /// Replace the OTP policy (code lifetime, attempt budget, delivery timeout)
    pub fn with_otp_config(mut self, config: OtpConfig) -> Self {
        self.otp_service = Self::build_otp_service(&self.repositories, &self.delivery, config);
        self
    }

    /// Replace the session policy (token lifetimes, signing configuration)
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_service = SessionService::new(
            Arc::new(AccountRepositoryAdapter::new(self.repositories.clone())),
            config,
        );
        self
    }

    fn build_otp_service(
        repositories: &Arc<R>,
        delivery: &Arc<Box<dyn OtpDelivery>>,
        config: OtpConfig,
    ) -> OtpService<
        AccountRepositoryAdapter<R>,
        PasswordRepositoryAdapter<R>,
        ChallengeRepositoryAdapter<R>,
        Box<dyn OtpDelivery>,
    > {
        OtpService::new(
            Arc::new(AccountRepositoryAdapter::new(repositories.clone())),
            Arc::new(PasswordRepositoryAdapter::new(repositories.clone())),
            Arc::new(ChallengeRepositoryAdapter::new(repositories.clone())),
            delivery.clone(),
            config,
        )
    }

    /// Register a new account with a password
    ///
    /// The password is hashed with argon2 before it is stored; the plaintext
    /// never reaches a repository.
    pub async fn register_account(
        &self,
        new_account: NewAccount,
        password: &str,
    ) -> Result<Account, DwarError> {
        dwar_core::validation::validate_email(&new_account.email)
            .map_err(dwar_core::Error::Validation)?;
        dwar_core::validation::validate_password(password)
            .map_err(dwar_core::Error::Validation)?;

        let hash = password_auth::generate_hash(password);
        let account = self.repositories.account().create(new_account).await?;
        self.repositories
            .password()
            .set_password_hash(&account.id, &hash)
            .await?;

        tracing::info!(account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Start a login: check credentials and dispatch a one-time code
    ///
    /// Returns the challenge handle the caller must present to
    /// [`verify_otp`](Self::verify_otp) together with the delivered code.
    pub async fn send_otp(
        &self,
        email: &str,
        password: &str,
        channel: DeliveryChannel,
    ) -> Result<ChallengeHandle, DwarError> {
        Ok(self.otp_service.issue(email, password, channel).await?)
    }

    /// Start an admin login: like [`send_otp`](Self::send_otp), but rejected
    /// with `Forbidden` unless the account holds an admin role
    ///
    /// The role gate runs before any code is generated or dispatched, so a
    /// non-admin attempt leaves no challenge behind.
    pub async fn send_admin_otp(
        &self,
        email: &str,
        password: &str,
        channel: DeliveryChannel,
    ) -> Result<ChallengeHandle, DwarError> {
        let account = self.otp_service.authenticate(email, password).await?;
        if !account.role.is_admin() {
            return Err(dwar_core::Error::Auth(AuthError::InsufficientRole(
                account.role.to_string(),
            ))
            .into());
        }
        Ok(self.otp_service.issue_for_account(&account, channel).await?)
    }

    /// Complete the second login step: verify a one-time code and resolve the
    /// account it was issued for
    ///
    /// The challenge is consumed on success. Callers typically follow up with
    /// [`issue_session`](Self::issue_session).
    pub async fn verify_otp(
        &self,
        handle: &ChallengeId,
        code: &str,
        channel: DeliveryChannel,
    ) -> Result<Account, DwarError> {
        let identifier = self.otp_service.verify(handle, code, channel).await?;

        self.repositories
            .account()
            .find_by_channel(channel, &identifier)
            .await?
            .ok_or_else(|| DwarError::NotFound("Account not found".to_string()))
    }

    /// Admin variant of [`verify_otp`](Self::verify_otp)
    ///
    /// The code is consumed either way; an account that lost its admin role
    /// between the two steps gets `Forbidden` and must restart.
    pub async fn verify_admin_otp(
        &self,
        handle: &ChallengeId,
        code: &str,
        channel: DeliveryChannel,
    ) -> Result<Account, DwarError> {
        let account = self.verify_otp(handle, code, channel).await?;
        if !account.role.is_admin() {
            return Err(DwarError::Forbidden(format!(
                "Insufficient role: {}",
                account.role
            )));
        }
        Ok(account)
    }

    /// Issue a session token pair for a verified login
    ///
    /// `stay_signed_in` selects the refresh lifetime (1 day or 30 days by
    /// default). Overwrites any refresh token the account held before.
    pub async fn issue_session(
        &self,
        account_id: &AccountId,
        stay_signed_in: bool,
    ) -> Result<SessionPair, DwarError> {
        Ok(self
            .session_service
            .issue_session(account_id, stay_signed_in)
            .await?)
    }

    /// Mint a new access token from a live refresh token
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<String, DwarError> {
        Ok(self.session_service.refresh_session(refresh_token).await?)
    }

    /// Revoke a refresh token; succeeds whether or not the token was live
    pub async fn revoke_session(&self, refresh_token: &str) -> Result<(), DwarError> {
        Ok(self.session_service.revoke(refresh_token).await?)
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, DwarError> {
        Ok(self.session_service.verify_access_token(token)?)
    }

    /// Lifetimes currently configured for issued sessions
    pub fn session_config(&self) -> &SessionConfig {
        self.session_service.config()
    }

    /// Get an account by ID
    pub async fn get_account(&self, id: &AccountId) -> Result<Option<Account>, DwarError> {
        Ok(self.repositories.account().find_by_id(id).await?)
    }

    /// Check the health of the underlying storage
    pub async fn health_check(&self) -> Result<(), DwarError> {
        Ok(self.repositories.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dwar_core::error::SessionError;

    #[test]
    fn test_error_flattening() {
        let e: DwarError = dwar_core::Error::Auth(AuthError::InvalidCredentials).into();
        assert!(matches!(e, DwarError::Auth(_)));

        let e: DwarError = dwar_core::Error::Auth(AuthError::AccountNotFound).into();
        assert!(matches!(e, DwarError::NotFound(_)));

        let e: DwarError =
            dwar_core::Error::Auth(AuthError::InsufficientRole("user".into())).into();
        assert!(matches!(e, DwarError::Forbidden(_)));

        let e: DwarError = dwar_core::Error::Challenge(ChallengeError::Expired).into();
        assert!(matches!(e, DwarError::Expired(_)));

        let e: DwarError = dwar_core::Error::Session(SessionError::NotFound).into();
        assert!(matches!(e, DwarError::Unauthorized(_)));

        let e: DwarError = dwar_core::Error::Delivery(
            dwar_core::error::DeliveryError::Transport("smtp down".into()),
        )
        .into();
        assert!(matches!(e, DwarError::Delivery(_)));

        let e: DwarError =
            dwar_core::Error::Storage(dwar_core::error::StorageError::NotFound).into();
        assert!(matches!(e, DwarError::Internal(_)));
        // Internal details never surface in the message
        assert_eq!(e.to_string(), "Internal error");
    }
}
