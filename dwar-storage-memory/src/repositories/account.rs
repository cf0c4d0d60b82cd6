use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dwar_core::{
    Account, AccountId, Error,
    account::{NewAccount, RefreshTokenRecord},
    error::StorageError,
    repositories::AccountRepository,
};

/// In-memory account repository
///
/// Accounts are keyed by ID; email, phone, and refresh-token lookups scan the
/// map. Fine for the account counts this backend is meant for.
pub struct MemoryAccountRepository {
    accounts: DashMap<AccountId, Account>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }
}

impl Default for MemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account, Error> {
        let account = Account::builder()
            .id(new_account.id)
            .username(new_account.username)
            .email(new_account.email)
            .phone(new_account.phone)
            .role(new_account.role)
            .build()?;

        self.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        Ok(self.accounts.get(id).map(|a| a.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.email == email)
            .map(|a| a.clone()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.phone.as_deref() == Some(phone))
            .map(|a| a.clone()))
    }

    async fn set_refresh_token(
        &self,
        id: &AccountId,
        record: RefreshTokenRecord,
    ) -> Result<(), Error> {
        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or(Error::Storage(StorageError::NotFound))?;
        account.refresh_token = Some(record);
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn find_by_refresh_token(&self, token: &str) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.refresh_token.as_ref().is_some_and(|r| r.token == token))
            .map(|a| a.clone()))
    }

    async fn clear_refresh_token(&self, token: &str) -> Result<(), Error> {
        // No-op when no account holds the token
        for mut account in self.accounts.iter_mut() {
            if account.refresh_token.as_ref().is_some_and(|r| r.token == token) {
                account.refresh_token = None;
                account.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<(), Error> {
        self.accounts.remove(id);
        Ok(())
    }
}
