use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::models::domain::{AnswerSet, AnswerValue, MatchRecord, PairKey};
use crate::services::store::{Storage, StorageError};

/// PostgreSQL storage backend.
///
/// Answer sets live in `answer_sets` with the normalized answers as a
/// JSONB map; match records live in `match_records` keyed by the canonical
/// (user_a < user_b) pair. Migrations run on startup.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StorageError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    fn answer_set_from_row(row: &sqlx::postgres::PgRow) -> Result<AnswerSet, StorageError> {
        let raw: serde_json::Value = row.get("answers");
        let answers: BTreeMap<String, AnswerValue> = serde_json::from_value(raw)?;
        Ok(AnswerSet::new(answers, row.get("submitted_at")))
    }

    fn match_record_from_row(
        pair: PairKey,
        row: &sqlx::postgres::PgRow,
    ) -> MatchRecord {
        MatchRecord {
            pair,
            compatibility: row.get("compatibility"),
            status_a: row.get("status_a"),
            status_b: row.get("status_b"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

#[async_trait]
impl Storage for PostgresStore {
    async fn load_answer_set(&self, user_id: &str) -> Result<Option<AnswerSet>, StorageError> {
        let query = r#"
            SELECT answers, submitted_at
            FROM answer_sets
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::answer_set_from_row(&row)).transpose()
    }

    async fn save_answer_set(&self, user_id: &str, set: &AnswerSet) -> Result<(), StorageError> {
        let query = r#"
            INSERT INTO answer_sets (user_id, answers, submitted_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET
                answers = EXCLUDED.answers,
                submitted_at = EXCLUDED.submitted_at
        "#;

        let answers = serde_json::to_value(&set.answers)?;

        sqlx::query(query)
            .bind(user_id)
            .bind(answers)
            .bind(set.submitted_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Stored answer set for {} ({} answers)", user_id, set.len());

        Ok(())
    }

    async fn list_answer_sets(&self) -> Result<Vec<(String, AnswerSet)>, StorageError> {
        let query = r#"
            SELECT user_id, answers, submitted_at
            FROM answer_sets
            ORDER BY user_id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        let mut all = Vec::with_capacity(rows.len());
        for row in &rows {
            let user_id: String = row.get("user_id");
            all.push((user_id, Self::answer_set_from_row(row)?));
        }

        tracing::debug!("Loaded {} answer sets", all.len());

        Ok(all)
    }

    async fn load_match_record(&self, pair: &PairKey) -> Result<Option<MatchRecord>, StorageError> {
        let query = r#"
            SELECT compatibility, status_a, status_b, created_at, updated_at
            FROM match_records
            WHERE user_a = $1 AND user_b = $2
        "#;

        let row = sqlx::query(query)
            .bind(pair.a())
            .bind(pair.b())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Self::match_record_from_row(pair.clone(), &row)))
    }

    async fn save_match_record(&self, record: &MatchRecord) -> Result<(), StorageError> {
        let query = r#"
            INSERT INTO match_records
                (user_a, user_b, compatibility, status_a, status_b, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_a, user_b)
            DO UPDATE SET
                compatibility = EXCLUDED.compatibility,
                status_a = EXCLUDED.status_a,
                status_b = EXCLUDED.status_b,
                updated_at = EXCLUDED.updated_at
        "#;

        sqlx::query(query)
            .bind(record.pair.a())
            .bind(record.pair.b())
            .bind(record.compatibility)
            .bind(record.status_a)
            .bind(record.status_b)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Stored match record {} <-> {} ({:.2})",
            record.pair.a(),
            record.pair.b(),
            record.compatibility
        );

        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::domain::MatchStatus;

    #[test]
    fn test_match_status_maps_to_lowercase() {
        // Column values for the match_status Postgres enum
        let json = serde_json::to_value(MatchStatus::Accepted).unwrap();
        assert_eq!(json, "accepted");
    }
}
