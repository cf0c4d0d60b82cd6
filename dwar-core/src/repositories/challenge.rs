use crate::{
    Error,
    challenge::{ChallengeId, OtpChallenge},
};
use async_trait::async_trait;

/// Repository for one-time-code challenge data access
#[async_trait]
pub trait ChallengeRepository: Send + Sync + 'static {
    /// Store a new challenge keyed by its handle
    async fn create(&self, challenge: OtpChallenge) -> Result<OtpChallenge, Error>;

    /// Look up a challenge without consuming it
    async fn find(&self, id: &ChallengeId) -> Result<Option<OtpChallenge>, Error>;

    /// Atomically remove and return a challenge
    ///
    /// Backends must implement this as a delete-on-read (or compare-and-delete)
    /// so that exactly one of two concurrent verifiers for the same handle
    /// observes the challenge; the loser gets `None`.
    async fn consume(&self, id: &ChallengeId) -> Result<Option<OtpChallenge>, Error>;

    /// Delete a challenge (expiry or attempt exhaustion)
    async fn delete(&self, id: &ChallengeId) -> Result<(), Error>;

    /// Record one incorrect code submission, returning the new total
    ///
    /// The increment must be atomic so concurrent wrong guesses are all
    /// counted. Returns `None` if the challenge no longer exists.
    async fn record_failed_attempt(&self, id: &ChallengeId) -> Result<Option<u32>, Error>;

    /// Remove all expired challenges
    async fn cleanup_expired(&self) -> Result<(), Error>;
}
