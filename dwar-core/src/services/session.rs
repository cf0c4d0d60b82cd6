use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    Error,
    account::{Account, AccountId, RefreshTokenRecord},
    error::{AuthError, SessionError},
    repositories::AccountRepository,
    token::{
        AccessClaims, JwtConfig, RefreshToken, SessionPair, sign_access_token,
        verify_access_token,
    },
};

/// Lifetimes for the two halves of a session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Signing configuration for access tokens
    pub jwt: JwtConfig,
    /// Access-token lifetime, fixed regardless of stay-signed-in
    pub access_ttl: Duration,
    /// Refresh lifetime for an ordinary login
    pub refresh_ttl: Duration,
    /// Refresh lifetime when the caller asks to stay signed in
    pub extended_refresh_ttl: Duration,
}

impl SessionConfig {
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            jwt,
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(1),
            extended_refresh_ttl: Duration::days(30),
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttls(mut self, ordinary: Duration, extended: Duration) -> Self {
        self.refresh_ttl = ordinary;
        self.extended_refresh_ttl = extended;
        self
    }

    /// Refresh lifetime for the given stay-signed-in choice
    pub fn refresh_ttl_for(&self, stay_signed_in: bool) -> Duration {
        if stay_signed_in {
            self.extended_refresh_ttl
        } else {
            self.refresh_ttl
        }
    }
}

/// Service for issuing, renewing, and revoking session token pairs
pub struct SessionService<A>
where
    A: AccountRepository,
{
    account_repository: Arc<A>,
    config: SessionConfig,
}

impl<A> SessionService<A>
where
    A: AccountRepository,
{
    pub fn new(account_repository: Arc<A>, config: SessionConfig) -> Self {
        Self {
            account_repository,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issue a fresh session pair for a fully verified login
    ///
    /// Each account holds at most one refresh token; issuing a new pair
    /// overwrites the previous token, so a later login from any device
    /// silently revokes earlier ones.
    pub async fn issue_session(
        &self,
        account_id: &AccountId,
        stay_signed_in: bool,
    ) -> Result<SessionPair, Error> {
        // The account can vanish between code verification and issuance
        let account = self
            .account_repository
            .find_by_id(account_id)
            .await?
            .ok_or(Error::Auth(AuthError::AccountNotFound))?;

        let refresh_token = RefreshToken::new_random();
        let refresh_expires_at = Utc::now() + self.config.refresh_ttl_for(stay_signed_in);

        self.account_repository
            .set_refresh_token(
                account_id,
                RefreshTokenRecord {
                    token: refresh_token.as_str().to_string(),
                    expires_at: refresh_expires_at,
                },
            )
            .await?;

        let access_token = self.sign_for(&account)?;

        tracing::info!(account_id = %account.id, stay_signed_in, "session issued");

        Ok(SessionPair {
            access_token,
            refresh_token,
            refresh_expires_at,
            profile: account.profile(),
        })
    }

    /// Mint a new access token from a live refresh token
    ///
    /// The refresh token itself is not rotated; it stays valid until its
    /// original expiry or until overwritten by a later login.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<String, Error> {
        let account = self
            .account_repository
            .find_by_refresh_token(refresh_token)
            .await?
            .ok_or(Error::Session(SessionError::NotFound))?;

        let record = account
            .refresh_token
            .as_ref()
            .ok_or(Error::Session(SessionError::NotFound))?;

        if record.is_expired() {
            self.account_repository
                .clear_refresh_token(refresh_token)
                .await?;
            return Err(Error::Session(SessionError::Expired));
        }

        self.sign_for(&account)
    }

    /// Revoke a refresh token
    ///
    /// Idempotent: revoking a token no account holds succeeds, so repeated
    /// logouts and logouts after expiry behave the same as the first.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), Error> {
        self.account_repository
            .clear_refresh_token(refresh_token)
            .await?;
        tracing::debug!("refresh token revoked");
        Ok(())
    }

    /// Verify an access token and return its claims
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, Error> {
        verify_access_token(token, &self.config.jwt)
            .map_err(|e| Error::Session(SessionError::InvalidToken(e.to_string())))
    }

    /// Resolve the account a live refresh token belongs to
    pub async fn account_for_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Account>, Error> {
        self.account_repository
            .find_by_refresh_token(refresh_token)
            .await
    }

    fn sign_for(&self, account: &Account) -> Result<String, Error> {
        let claims = AccessClaims::for_account(
            account,
            self.config.access_ttl,
            self.config.jwt.issuer.clone(),
        );
        sign_access_token(&claims, &self.config.jwt)
    }
}
