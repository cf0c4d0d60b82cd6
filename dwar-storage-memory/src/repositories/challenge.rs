use async_trait::async_trait;
use dashmap::DashMap;
use dwar_core::{
    ChallengeId, Error, OtpChallenge, repositories::ChallengeRepository,
};

/// In-memory one-time-code challenge repository
///
/// `consume` rides on `DashMap::remove`, which takes the shard lock, so two
/// concurrent consumers of the same handle cannot both get the challenge
/// back. `record_failed_attempt` increments under the same shard lock.
pub struct MemoryChallengeRepository {
    challenges: DashMap<ChallengeId, OtpChallenge>,
}

impl MemoryChallengeRepository {
    pub fn new() -> Self {
        Self {
            challenges: DashMap::new(),
        }
    }
}

impl Default for MemoryChallengeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChallengeRepository for MemoryChallengeRepository {
    async fn create(&self, challenge: OtpChallenge) -> Result<OtpChallenge, Error> {
        self.challenges
            .insert(challenge.id.clone(), challenge.clone());
        Ok(challenge)
    }

    async fn find(&self, id: &ChallengeId) -> Result<Option<OtpChallenge>, Error> {
        Ok(self.challenges.get(id).map(|c| c.clone()))
    }

    async fn consume(&self, id: &ChallengeId) -> Result<Option<OtpChallenge>, Error> {
        Ok(self.challenges.remove(id).map(|(_, c)| c))
    }

    async fn delete(&self, id: &ChallengeId) -> Result<(), Error> {
        self.challenges.remove(id);
        Ok(())
    }

    async fn record_failed_attempt(&self, id: &ChallengeId) -> Result<Option<u32>, Error> {
        Ok(self.challenges.get_mut(id).map(|mut c| {
            c.failed_attempts += 1;
            c.failed_attempts
        }))
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        self.challenges.retain(|_, c| !c.is_expired());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dwar_core::DeliveryChannel;
    use std::sync::Arc;

    fn challenge(ttl: Duration) -> OtpChallenge {
        OtpChallenge::new("asha@example.com", DeliveryChannel::Email, ttl)
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let repo = MemoryChallengeRepository::new();
        let stored = repo.create(challenge(Duration::minutes(5))).await.unwrap();

        assert!(repo.consume(&stored.id).await.unwrap().is_some());
        assert!(repo.consume(&stored.id).await.unwrap().is_none());
        assert!(repo.find(&stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_consume_has_one_winner() {
        let repo = Arc::new(MemoryChallengeRepository::new());
        let stored = repo.create(challenge(Duration::minutes(5))).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            let id = stored.id.clone();
            handles.push(tokio::spawn(async move {
                repo.consume(&id).await.unwrap().is_some()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_record_failed_attempt_counts_up() {
        let repo = MemoryChallengeRepository::new();
        let stored = repo.create(challenge(Duration::minutes(5))).await.unwrap();

        assert_eq!(repo.record_failed_attempt(&stored.id).await.unwrap(), Some(1));
        assert_eq!(repo.record_failed_attempt(&stored.id).await.unwrap(), Some(2));

        repo.delete(&stored.id).await.unwrap();
        assert_eq!(repo.record_failed_attempt(&stored.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cleanup_expired_removes_only_stale() {
        let repo = MemoryChallengeRepository::new();
        let live = repo.create(challenge(Duration::minutes(5))).await.unwrap();
        let stale = repo.create(challenge(Duration::minutes(-1))).await.unwrap();

        repo.cleanup_expired().await.unwrap();

        assert!(repo.find(&live.id).await.unwrap().is_some());
        assert!(repo.find(&stale.id).await.unwrap().is_none());
    }
}
