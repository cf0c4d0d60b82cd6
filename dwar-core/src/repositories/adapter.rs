use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Error,
    account::{Account, AccountId, NewAccount, RefreshTokenRecord},
    challenge::{ChallengeId, OtpChallenge},
    repositories::{
        AccountRepository, ChallengeRepository, PasswordRepository, RepositoryProvider,
    },
};

/// Adapter that wraps a [`RepositoryProvider`] and implements the individual
/// repository traits, so services stay generic over single repositories while
/// callers hand in one provider.
pub struct AccountRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AccountRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AccountRepository for AccountRepositoryAdapter<R> {
    async fn create(&self, account: NewAccount) -> Result<Account, Error> {
        self.provider.account().create(account).await
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_email(email).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_phone(phone).await
    }

    async fn set_refresh_token(
        &self,
        id: &AccountId,
        record: RefreshTokenRecord,
    ) -> Result<(), Error> {
        self.provider.account().set_refresh_token(id, record).await
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_refresh_token(token).await
    }

    async fn clear_refresh_token(&self, token: &str) -> Result<(), Error> {
        self.provider.account().clear_refresh_token(token).await
    }

    async fn delete(&self, id: &AccountId) -> Result<(), Error> {
        self.provider.account().delete(id).await
    }
}

pub struct PasswordRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> PasswordRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> PasswordRepository for PasswordRepositoryAdapter<R> {
    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error> {
        self.provider.password().set_password_hash(id, hash).await
    }

    async fn get_password_hash(&self, id: &AccountId) -> Result<Option<String>, Error> {
        self.provider.password().get_password_hash(id).await
    }

    async fn remove_password_hash(&self, id: &AccountId) -> Result<(), Error> {
        self.provider.password().remove_password_hash(id).await
    }
}

pub struct ChallengeRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> ChallengeRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> ChallengeRepository for ChallengeRepositoryAdapter<R> {
    async fn create(&self, challenge: OtpChallenge) -> Result<OtpChallenge, Error> {
        self.provider.challenge().create(challenge).await
    }

    async fn find(&self, id: &ChallengeId) -> Result<Option<OtpChallenge>, Error> {
        self.provider.challenge().find(id).await
    }

    async fn consume(&self, id: &ChallengeId) -> Result<Option<OtpChallenge>, Error> {
        self.provider.challenge().consume(id).await
    }

    async fn delete(&self, id: &ChallengeId) -> Result<(), Error> {
        self.provider.challenge().delete(id).await
    }

    async fn record_failed_attempt(&self, id: &ChallengeId) -> Result<Option<u32>, Error> {
        self.provider.challenge().record_failed_attempt(id).await
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        self.provider.challenge().cleanup_expired().await
    }
}
