//! Repository implementations for in-memory storage

pub mod account;
pub mod challenge;
pub mod password;

pub use account::MemoryAccountRepository;
pub use challenge::MemoryChallengeRepository;
pub use password::MemoryPasswordRepository;

use std::sync::Arc;

use async_trait::async_trait;
use dwar_core::{
    Error,
    repositories::{
        AccountRepositoryProvider, ChallengeRepositoryProvider, PasswordRepositoryProvider,
        RepositoryProvider,
    },
};

/// Repository provider backed entirely by in-memory maps
pub struct MemoryRepositoryProvider {
    account: Arc<MemoryAccountRepository>,
    password: Arc<MemoryPasswordRepository>,
    challenge: Arc<MemoryChallengeRepository>,
}

impl MemoryRepositoryProvider {
    pub fn new() -> Self {
        Self {
            account: Arc::new(MemoryAccountRepository::new()),
            password: Arc::new(MemoryPasswordRepository::new()),
            challenge: Arc::new(MemoryChallengeRepository::new()),
        }
    }
}

impl Default for MemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountRepositoryProvider for MemoryRepositoryProvider {
    type AccountRepo = MemoryAccountRepository;

    fn account(&self) -> &Self::AccountRepo {
        &self.account
    }
}

impl PasswordRepositoryProvider for MemoryRepositoryProvider {
    type PasswordRepo = MemoryPasswordRepository;

    fn password(&self) -> &Self::PasswordRepo {
        &self.password
    }
}

impl ChallengeRepositoryProvider for MemoryRepositoryProvider {
    type ChallengeRepo = MemoryChallengeRepository;

    fn challenge(&self) -> &Self::ChallengeRepo {
        &self.challenge
    }
}

#[async_trait]
impl RepositoryProvider for MemoryRepositoryProvider {
    async fn health_check(&self) -> Result<(), Error> {
        // Nothing external to probe
        Ok(())
    }
}
