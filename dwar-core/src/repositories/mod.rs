//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to
//! interact with storage. These traits provide a clean abstraction over the
//! underlying storage implementation.
//!
//! # Trait Hierarchy
//!
//! The repository system uses a composable trait hierarchy:
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining all provider traits plus
//!   lifecycle methods
//!
//! The identity store and the pending-challenge store are the only shared
//! mutable resources in the system; every mutation below is a single-record
//! operation scoped to one account or one handle, so backends never need
//! multi-record transactions.

pub mod account;
pub mod adapter;
pub mod challenge;
pub mod password;

pub use account::AccountRepository;
pub use adapter::{AccountRepositoryAdapter, ChallengeRepositoryAdapter, PasswordRepositoryAdapter};
pub use challenge::ChallengeRepository;
pub use password::PasswordRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for account repository access.
pub trait AccountRepositoryProvider: Send + Sync + 'static {
    /// The account repository implementation type
    type AccountRepo: AccountRepository;

    /// Get the account repository
    fn account(&self) -> &Self::AccountRepo;
}

/// Provider trait for password repository access.
pub trait PasswordRepositoryProvider: Send + Sync + 'static {
    /// The password repository implementation type
    type PasswordRepo: PasswordRepository;

    /// Get the password repository
    fn password(&self) -> &Self::PasswordRepo;
}

/// Provider trait for challenge repository access.
pub trait ChallengeRepositoryProvider: Send + Sync + 'static {
    /// The challenge repository implementation type
    type ChallengeRepo: ChallengeRepository;

    /// Get the challenge repository
    fn challenge(&self) -> &Self::ChallengeRepo;
}

/// Provider trait that storage implementations must implement to provide all
/// repositories.
///
/// # Implementing a Custom Storage Backend
///
/// To implement a custom storage backend, you need to:
/// 1. Implement each individual `*Repository` trait for your backend
/// 2. Implement each individual `*RepositoryProvider` trait
/// 3. Implement the `RepositoryProvider` trait with `health_check()`
#[async_trait]
pub trait RepositoryProvider:
    AccountRepositoryProvider + PasswordRepositoryProvider + ChallengeRepositoryProvider
{
    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
