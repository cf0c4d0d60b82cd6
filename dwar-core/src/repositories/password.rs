use crate::{Error, account::AccountId};
use async_trait::async_trait;

/// Repository for password hash data access
///
/// Hashes live apart from the account record so account reads never carry
/// credential material.
#[async_trait]
pub trait PasswordRepository: Send + Sync + 'static {
    /// Set the password hash for an account
    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error>;

    /// Get the password hash for an account
    async fn get_password_hash(&self, id: &AccountId) -> Result<Option<String>, Error>;

    /// Remove the password hash for an account
    async fn remove_password_hash(&self, id: &AccountId) -> Result<(), Error>;
}
