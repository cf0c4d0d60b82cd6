use async_trait::async_trait;
use dashmap::DashMap;
use dwar_core::{AccountId, Error, repositories::PasswordRepository};

/// In-memory password hash repository
pub struct MemoryPasswordRepository {
    hashes: DashMap<AccountId, String>,
}

impl MemoryPasswordRepository {
    pub fn new() -> Self {
        Self {
            hashes: DashMap::new(),
        }
    }
}

impl Default for MemoryPasswordRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordRepository for MemoryPasswordRepository {
    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error> {
        self.hashes.insert(id.clone(), hash.to_string());
        Ok(())
    }

    async fn get_password_hash(&self, id: &AccountId) -> Result<Option<String>, Error> {
        Ok(self.hashes.get(id).map(|h| h.clone()))
    }

    async fn remove_password_hash(&self, id: &AccountId) -> Result<(), Error> {
        self.hashes.remove(id);
        Ok(())
    }
}
