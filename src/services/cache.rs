use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::models::domain::AnswerSet;
use crate::services::store::{Storage, StorageError};

const POPULATION_KEY: &str = "population";

/// Short-TTL cache over the full answer-set population.
///
/// Ranking needs every stored answer set; loading them on each request is
/// the dominant cost once the user base grows. The snapshot may lag a
/// concurrent submission by up to the TTL, which ranking tolerates, and
/// saves invalidate it so the common case is fresher than that. The
/// viewer's own answers are always loaded directly, never from here.
pub struct PopulationCache {
    snapshot: Cache<&'static str, Arc<Vec<(String, AnswerSet)>>>,
}

impl PopulationCache {
    pub fn new(ttl_secs: u64) -> Self {
        let snapshot = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { snapshot }
    }

    /// The cached population snapshot, loading from storage on a miss.
    pub async fn population(
        &self,
        store: &dyn Storage,
    ) -> Result<Arc<Vec<(String, AnswerSet)>>, StorageError> {
        if let Some(snapshot) = self.snapshot.get(POPULATION_KEY).await {
            tracing::trace!("Population cache hit ({} users)", snapshot.len());
            return Ok(snapshot);
        }

        let fresh = Arc::new(store.list_answer_sets().await?);
        self.snapshot.insert(POPULATION_KEY, fresh.clone()).await;
        tracing::debug!("Population cache refreshed ({} users)", fresh.len());

        Ok(fresh)
    }

    /// Drop the snapshot, forcing the next read to hit storage.
    pub async fn invalidate(&self) {
        self.snapshot.invalidate(POPULATION_KEY).await;
    }
}
