use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::domain::{AnswerSet, MatchRecord, PairKey};
use crate::services::store::{Storage, StorageError};

/// In-memory storage backend.
///
/// Used by the test suite and by deployments that have no DATABASE_URL
/// configured. Everything lives in process memory and is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    answer_sets: RwLock<HashMap<String, AnswerSet>>,
    match_records: RwLock<HashMap<PairKey, MatchRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStore {
    async fn load_answer_set(&self, user_id: &str) -> Result<Option<AnswerSet>, StorageError> {
        let sets = self.answer_sets.read().await;
        Ok(sets.get(user_id).cloned())
    }

    async fn save_answer_set(&self, user_id: &str, set: &AnswerSet) -> Result<(), StorageError> {
        let mut sets = self.answer_sets.write().await;
        sets.insert(user_id.to_string(), set.clone());
        Ok(())
    }

    async fn list_answer_sets(&self) -> Result<Vec<(String, AnswerSet)>, StorageError> {
        let sets = self.answer_sets.read().await;
        let mut all: Vec<(String, AnswerSet)> = sets
            .iter()
            .map(|(user_id, set)| (user_id.clone(), set.clone()))
            .collect();
        all.sort_by(|x, y| x.0.cmp(&y.0));
        Ok(all)
    }

    async fn load_match_record(&self, pair: &PairKey) -> Result<Option<MatchRecord>, StorageError> {
        let records = self.match_records.read().await;
        Ok(records.get(pair).cloned())
    }

    async fn save_match_record(&self, record: &MatchRecord) -> Result<(), StorageError> {
        let mut records = self.match_records.write().await;
        records.insert(record.pair.clone(), record.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }
}
