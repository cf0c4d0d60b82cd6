use std::sync::Arc;

use chrono::Duration;

use crate::{
    Error,
    account::Account,
    challenge::{ChallengeId, DeliveryChannel, OtpChallenge},
    error::{AuthError, ChallengeError, DeliveryError, ValidationError},
    repositories::{AccountRepository, ChallengeRepository, PasswordRepository},
    services::delivery::OtpDelivery,
    validation::{validate_email, validate_otp_code, validate_password},
};

/// Policy knobs for code issuance and verification
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// How long an issued code stays verifiable
    pub ttl: Duration,
    /// Incorrect submissions tolerated before the challenge is invalidated
    pub max_attempts: u32,
    /// Bound on the outbound delivery call; a slow transport must not hold
    /// the issuing request open indefinitely
    pub delivery_timeout: std::time::Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(5),
            max_attempts: 5,
            delivery_timeout: std::time::Duration::from_secs(10),
        }
    }
}

/// What the caller gets back from issuance: the handle and where the code
/// went, never the code itself.
#[derive(Debug, Clone)]
pub struct ChallengeHandle {
    pub handle: ChallengeId,
    pub channel: DeliveryChannel,
    pub message: String,
}

/// Service for one-time-code issuance and verification
pub struct OtpService<A, P, C, D>
where
    A: AccountRepository,
    P: PasswordRepository,
    C: ChallengeRepository,
    D: OtpDelivery,
{
    account_repository: Arc<A>,
    password_repository: Arc<P>,
    challenge_repository: Arc<C>,
    delivery: Arc<D>,
    config: OtpConfig,
}

impl<A, P, C, D> OtpService<A, P, C, D>
where
    A: AccountRepository,
    P: PasswordRepository,
    C: ChallengeRepository,
    D: OtpDelivery,
{
    /// Create a new OtpService with the given repositories and transport
    pub fn new(
        account_repository: Arc<A>,
        password_repository: Arc<P>,
        challenge_repository: Arc<C>,
        delivery: Arc<D>,
        config: OtpConfig,
    ) -> Self {
        Self {
            account_repository,
            password_repository,
            challenge_repository,
            delivery,
            config,
        }
    }

    /// Check primary credentials and return the account they belong to
    ///
    /// Shared by ordinary and role-gated issuance paths; callers apply their
    /// own role checks on the returned account.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, Error> {
        validate_email(email)?;
        validate_password(password)?;

        let account = self
            .account_repository
            .find_by_email(email)
            .await?
            .ok_or(Error::Auth(AuthError::AccountNotFound))?;

        let hash = self
            .password_repository
            .get_password_hash(&account.id)
            .await?
            .ok_or(Error::Auth(AuthError::InvalidCredentials))?;

        if password_auth::verify_password(password, &hash).is_err() {
            return Err(Error::Auth(AuthError::InvalidCredentials));
        }

        Ok(account)
    }

    /// Issue a one-time code for a login attempt whose primary credentials
    /// check out, dispatching it through the requested channel
    ///
    /// The code is stored against a fresh unguessable handle and delivered
    /// out-of-band; only the handle is returned. If delivery fails the stored
    /// challenge is rolled back so no unverifiable code lingers, and the
    /// caller may retry issuance.
    pub async fn issue(
        &self,
        email: &str,
        password: &str,
        channel: DeliveryChannel,
    ) -> Result<ChallengeHandle, Error> {
        let account = self.authenticate(email, password).await?;
        self.issue_for_account(&account, channel).await
    }

    /// Issue a code for an already-authenticated account
    pub async fn issue_for_account(
        &self,
        account: &Account,
        channel: DeliveryChannel,
    ) -> Result<ChallengeHandle, Error> {
        let identifier = account.channel_value(channel).ok_or_else(|| {
            Error::Validation(ValidationError::MissingChannel(
                channel.field_name().to_string(),
            ))
        })?;

        let challenge = OtpChallenge::new(identifier, channel, self.config.ttl);
        let challenge = self.challenge_repository.create(challenge).await?;

        let dispatch = self
            .delivery
            .send_code(channel, &challenge.identifier, &challenge.code);

        let result = match tokio::time::timeout(self.config.delivery_timeout, dispatch).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Delivery(e)),
            Err(_) => Err(Error::Delivery(DeliveryError::Timeout(
                self.config.delivery_timeout.as_secs() as i64,
            ))),
        };

        if let Err(e) = result {
            // No challenge may outlive a failed dispatch: a stored code that
            // was never delivered can never be verified.
            self.challenge_repository.delete(&challenge.id).await?;
            tracing::warn!(handle = %challenge.id, %channel, "code dispatch failed, challenge rolled back");
            return Err(e);
        }

        tracing::info!(handle = %challenge.id, %channel, "one-time code issued");

        Ok(ChallengeHandle {
            handle: challenge.id,
            channel,
            message: format!("One-time code sent via {channel}"),
        })
    }

    /// Verify a submitted code against its challenge
    ///
    /// Consumes the challenge on success (single-use). A wrong code leaves
    /// the challenge verifiable until the mismatch budget is exhausted, at
    /// which point the challenge is invalidated and the login attempt must
    /// restart. Returns the identifier the challenge was issued for.
    pub async fn verify(
        &self,
        handle: &ChallengeId,
        code: &str,
        channel: DeliveryChannel,
    ) -> Result<String, Error> {
        validate_otp_code(code)?;

        let challenge = self
            .challenge_repository
            .find(handle)
            .await?
            .ok_or(Error::Challenge(ChallengeError::NotFound))?;

        if challenge.is_expired() {
            self.challenge_repository.delete(handle).await?;
            return Err(Error::Challenge(ChallengeError::Expired));
        }

        if challenge.channel != channel {
            return Err(Error::Challenge(ChallengeError::ChannelMismatch));
        }

        if challenge.code != code {
            match self.challenge_repository.record_failed_attempt(handle).await? {
                Some(attempts) if attempts >= self.config.max_attempts => {
                    self.challenge_repository.delete(handle).await?;
                    tracing::warn!(%handle, attempts, "mismatch budget exhausted, challenge invalidated");
                    return Err(Error::Auth(AuthError::TooManyAttempts));
                }
                Some(_) => return Err(Error::Auth(AuthError::CodeMismatch)),
                // Challenge vanished between find and increment
                None => return Err(Error::Challenge(ChallengeError::NotFound)),
            }
        }

        // Atomic delete-on-read: of two concurrent verifiers submitting the
        // correct code, exactly one gets the challenge back.
        let consumed = self
            .challenge_repository
            .consume(handle)
            .await?
            .ok_or(Error::Challenge(ChallengeError::NotFound))?;

        tracing::info!(%handle, "one-time code verified");

        Ok(consumed.identifier)
    }
}
