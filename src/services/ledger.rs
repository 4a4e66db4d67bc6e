use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::domain::{Decision, MatchRecord, PairKey};
use crate::services::store::{Storage, StorageError};

/// Errors from match-state transitions
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("no match record exists for this pair")]
    UnknownPair,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Owns all reads and writes of match records.
///
/// Every read-modify-write of a pair's record runs under that pair's own
/// async lock, so two concurrent decisions on the same pair (or a decision
/// racing a score refresh) serialize instead of losing one half. Distinct
/// pairs never contend.
pub struct MatchLedger {
    store: Arc<dyn Storage>,
    pair_locks: Mutex<HashMap<PairKey, Arc<Mutex<()>>>>,
}

impl MatchLedger {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            store,
            pair_locks: Mutex::new(HashMap::new()),
        }
    }

    /// One lock per touched pair, created on first use.
    async fn pair_lock(&self, pair: &PairKey) -> Arc<Mutex<()>> {
        let mut locks = self.pair_locks.lock().await;
        locks
            .entry(pair.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record a freshly computed compatibility score for a pair.
    ///
    /// Creates the record (both statuses pending) the first time the pair is
    /// scored. On later calls the stored score is refreshed only when it
    /// actually changed; decision statuses are never touched from here.
    pub async fn record_score(
        &self,
        x: &str,
        y: &str,
        score: f64,
    ) -> Result<MatchRecord, LedgerError> {
        let pair = PairKey::new(x, y).ok_or(LedgerError::UnknownPair)?;
        let lock = self.pair_lock(&pair).await;
        let _guard = lock.lock().await;

        match self.store.load_match_record(&pair).await? {
            Some(mut record) => {
                if (record.compatibility - score).abs() > f64::EPSILON {
                    record.compatibility = score;
                    record.updated_at = Utc::now();
                    self.store.save_match_record(&record).await?;
                    tracing::debug!(
                        "Refreshed score for {} <-> {}: {:.2}",
                        pair.a(),
                        pair.b(),
                        score
                    );
                }
                Ok(record)
            }
            None => {
                let record = MatchRecord::new(pair.clone(), score, Utc::now());
                self.store.save_match_record(&record).await?;
                tracing::debug!(
                    "Created match record {} <-> {} at {:.2}",
                    pair.a(),
                    pair.b(),
                    score
                );
                Ok(record)
            }
        }
    }

    /// Apply `actor`'s accept/deny decision about `peer`.
    ///
    /// Only the actor's own half of the record changes; a decision can be
    /// revised later (accept then deny, or back). Fails with `UnknownPair`
    /// until the pair has been surfaced by a ranking at least once, and for
    /// a self-decision, which can never have a record.
    pub async fn decide(
        &self,
        actor: &str,
        peer: &str,
        decision: Decision,
    ) -> Result<MatchRecord, LedgerError> {
        let pair = PairKey::new(actor, peer).ok_or(LedgerError::UnknownPair)?;
        let lock = self.pair_lock(&pair).await;
        let _guard = lock.lock().await;

        let mut record = self
            .store
            .load_match_record(&pair)
            .await?
            .ok_or(LedgerError::UnknownPair)?;

        let status = decision.as_status();
        if record.status_of(actor) == Some(status) {
            // Repeating the same decision is a no-op
            return Ok(record);
        }

        record.set_status(actor, status);
        record.updated_at = Utc::now();
        self.store.save_match_record(&record).await?;

        tracing::info!(
            "{} marked {} as {:?} (mutual: {})",
            actor,
            peer,
            status,
            record.mutual()
        );

        Ok(record)
    }

    /// Current record for a pair, if any. A self-pair never has one.
    pub async fn get(&self, x: &str, y: &str) -> Result<Option<MatchRecord>, LedgerError> {
        let Some(pair) = PairKey::new(x, y) else {
            return Ok(None);
        };
        Ok(self.store.load_match_record(&pair).await?)
    }
}
