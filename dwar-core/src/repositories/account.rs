use crate::{
    Error,
    account::{Account, AccountId, NewAccount, RefreshTokenRecord},
    challenge::DeliveryChannel,
};
use async_trait::async_trait;

/// Repository for account data access
///
/// The refresh-token methods operate on the single persisted token per
/// account: `set_refresh_token` overwrites whatever was there before, and
/// `clear_refresh_token` is keyed by the token value so revocation does not
/// need to know which account the token belongs to.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Create a new account
    async fn create(&self, account: NewAccount) -> Result<Account, Error>;

    /// Find an account by ID
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error>;

    /// Find an account by email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error>;

    /// Find an account by phone number
    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, Error>;

    /// Find an account by the value of a delivery channel
    async fn find_by_channel(
        &self,
        channel: DeliveryChannel,
        value: &str,
    ) -> Result<Option<Account>, Error> {
        match channel {
            DeliveryChannel::Email => self.find_by_email(value).await,
            DeliveryChannel::Sms => self.find_by_phone(value).await,
        }
    }

    /// Persist a refresh token and its expiry, overwriting any previous one
    async fn set_refresh_token(
        &self,
        id: &AccountId,
        record: RefreshTokenRecord,
    ) -> Result<(), Error>;

    /// Find the account holding the given refresh token, if any
    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Account>, Error>;

    /// Clear the refresh token and its expiry from whichever account holds it
    ///
    /// A no-op when no account holds the token.
    async fn clear_refresh_token(&self, token: &str) -> Result<(), Error>;

    /// Delete an account
    async fn delete(&self, id: &AccountId) -> Result<(), Error>;
}
