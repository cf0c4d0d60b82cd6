//! In-memory storage backend
//!
//! Backs every repository with a concurrent map. Suited to tests, demos, and
//! single-process deployments where losing state on restart is acceptable;
//! anything else should use a persistent backend behind the same traits.

pub mod repositories;

pub use repositories::{
    MemoryAccountRepository, MemoryChallengeRepository, MemoryPasswordRepository,
    MemoryRepositoryProvider,
};
