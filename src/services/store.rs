use async_trait::async_trait;
use thiserror::Error;

use crate::models::domain::{AnswerSet, MatchRecord, PairKey};

/// Errors that can occur in a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence seam for answer sets and match records.
///
/// Backed by Postgres in production and by an in-memory map in tests and
/// unconfigured deployments. `save_answer_set` must replace any previous
/// set for the user wholesale; readers must never observe a partially
/// updated set.
#[async_trait]
pub trait Storage: Send + Sync {
    /// The user's current answer set, if they have completed the survey.
    async fn load_answer_set(&self, user_id: &str) -> Result<Option<AnswerSet>, StorageError>;

    /// Insert or atomically replace the user's answer set.
    async fn save_answer_set(&self, user_id: &str, set: &AnswerSet) -> Result<(), StorageError>;

    /// Every stored (user id, answer set), ordered by user id.
    async fn list_answer_sets(&self) -> Result<Vec<(String, AnswerSet)>, StorageError>;

    /// The match record for a canonical pair, if one was ever created.
    async fn load_match_record(&self, pair: &PairKey) -> Result<Option<MatchRecord>, StorageError>;

    /// Insert or replace the record for `record.pair`.
    async fn save_match_record(&self, record: &MatchRecord) -> Result<(), StorageError>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> Result<bool, StorageError>;
}
