// Integration tests for the full matching engine over in-memory storage

use chrono::Utc;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use roomeo_algo::core::{normalize_submission, rank_candidates};
use roomeo_algo::models::{Decision, MatchStatus, QuestionKind, QuestionnaireSchema};
use roomeo_algo::services::{
    LedgerError, MatchLedger, MemoryStore, PopulationCache, SchemaRegistry, Storage,
};

struct Engine {
    storage: Arc<dyn Storage>,
    ledger: MatchLedger,
    cache: PopulationCache,
    schema: Arc<QuestionnaireSchema>,
}

impl Engine {
    fn new() -> Self {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStore::new());
        Self {
            ledger: MatchLedger::new(storage.clone()),
            cache: PopulationCache::new(30),
            schema: Arc::new(QuestionnaireSchema::builtin()),
            storage,
        }
    }

    /// Submit a complete survey, as the submit endpoint would.
    async fn submit(&self, user_id: &str, answers: &HashMap<String, String>) {
        let set = normalize_submission(&self.schema, answers, Utc::now()).unwrap();
        self.storage.save_answer_set(user_id, &set).await.unwrap();
        self.cache.invalidate().await;
    }

    /// Rank a user and materialize match records, as the matches endpoint
    /// would: a defined score creates/refreshes the record, an undefined one
    /// only reads.
    async fn rank(&self, user_id: &str) -> Vec<(String, Option<f64>, MatchStatus, bool)> {
        let own = self
            .storage
            .load_answer_set(user_id)
            .await
            .unwrap()
            .expect("user has not completed the survey");
        let population = self.cache.population(self.storage.as_ref()).await.unwrap();
        let ranked = rank_candidates(user_id, &own, &population, &self.schema);

        let mut out = Vec::new();
        for candidate in ranked {
            let record = match candidate.compatibility {
                Some(score) => Some(
                    self.ledger
                        .record_score(user_id, &candidate.peer_id, score)
                        .await
                        .unwrap(),
                ),
                None => self.ledger.get(user_id, &candidate.peer_id).await.unwrap(),
            };
            let status = record
                .as_ref()
                .and_then(|r| r.status_of(user_id))
                .unwrap_or(MatchStatus::Pending);
            let mutual = record.as_ref().map(|r| r.mutual()).unwrap_or(false);
            out.push((candidate.peer_id, candidate.compatibility, status, mutual));
        }
        out
    }
}

/// Answer every question; `tidiness` drives the Likert answers so different
/// users land at different compatibility levels.
fn profile(tidiness: &str) -> HashMap<String, String> {
    QuestionnaireSchema::builtin()
        .questions()
        .map(|(id, question)| {
            let label = match question.kind {
                QuestionKind::YesNo => "Yes",
                QuestionKind::Likert5 => tidiness,
                QuestionKind::Frequency4 => "Sometimes",
                QuestionKind::FreeText => "grad student",
            };
            (id.to_string(), label.to_string())
        })
        .collect()
}

#[tokio::test]
async fn test_submit_rank_decide_mutual_flow() {
    let engine = Engine::new();

    engine.submit("alice", &profile("Agree")).await;
    engine.submit("bob", &profile("Agree")).await;
    engine.submit("carol", &profile("Strongly Disagree")).await;

    // Alice ranks: bob is the perfect match, carol trails
    let matches = engine.rank("alice").await;
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].0, "bob");
    assert_eq!(matches[0].1, Some(100.0));
    assert_eq!(matches[0].2, MatchStatus::Pending);
    assert!(matches[1].1.unwrap() < 100.0);

    // Alice accepts bob; not mutual until bob reciprocates
    let record = engine
        .ledger
        .decide("alice", "bob", Decision::Accepted)
        .await
        .unwrap();
    assert!(!record.mutual());

    // Bob still sees his own half as pending
    let bob_view = engine.rank("bob").await;
    let alice_entry = bob_view.iter().find(|(id, ..)| id == "alice").unwrap();
    assert_eq!(alice_entry.2, MatchStatus::Pending);
    assert!(!alice_entry.3);

    // Bob accepts back; both now see a mutual match
    let record = engine
        .ledger
        .decide("bob", "alice", Decision::Accepted)
        .await
        .unwrap();
    assert!(record.mutual());

    let alice_view = engine.rank("alice").await;
    let bob_entry = alice_view.iter().find(|(id, ..)| id == "bob").unwrap();
    assert_eq!(bob_entry.2, MatchStatus::Accepted);
    assert!(bob_entry.3);
}

#[tokio::test]
async fn test_decide_before_any_ranking_is_rejected() {
    let engine = Engine::new();

    engine.submit("alice", &profile("Agree")).await;
    engine.submit("bob", &profile("Agree")).await;

    // Both surveyed, but the pair was never surfaced by a ranking
    let result = engine.ledger.decide("alice", "bob", Decision::Accepted).await;
    assert!(matches!(result, Err(LedgerError::UnknownPair)));
}

#[tokio::test]
async fn test_denial_is_recorded_and_revocable() {
    let engine = Engine::new();

    engine.submit("alice", &profile("Agree")).await;
    engine.submit("bob", &profile("Neutral")).await;
    engine.rank("alice").await;

    engine
        .ledger
        .decide("alice", "bob", Decision::Denied)
        .await
        .unwrap();

    let matches = engine.rank("alice").await;
    assert_eq!(matches[0].2, MatchStatus::Denied);

    // A denial is not final
    let record = engine
        .ledger
        .decide("alice", "bob", Decision::Accepted)
        .await
        .unwrap();
    assert_eq!(record.status_of("alice"), Some(MatchStatus::Accepted));
}

#[tokio::test]
async fn test_resubmission_refreshes_scores_but_not_decisions() {
    let engine = Engine::new();

    engine.submit("alice", &profile("Agree")).await;
    engine.submit("bob", &profile("Strongly Disagree")).await;

    let before = engine.rank("alice").await;
    let low = before[0].1.unwrap();
    assert!(low < 100.0);

    engine
        .ledger
        .decide("alice", "bob", Decision::Accepted)
        .await
        .unwrap();

    // Bob aligns his answers with alice's and resubmits
    engine.submit("bob", &profile("Agree")).await;

    let after = engine.rank("alice").await;
    assert_eq!(after[0].1, Some(100.0));
    // The standing decision survives the score refresh
    assert_eq!(after[0].2, MatchStatus::Accepted);

    let record = engine.ledger.get("alice", "bob").await.unwrap().unwrap();
    assert_eq!(record.compatibility, 100.0);
}

#[tokio::test]
async fn test_new_submission_visible_after_invalidation() {
    let engine = Engine::new();

    engine.submit("alice", &profile("Agree")).await;
    engine.submit("bob", &profile("Agree")).await;
    assert_eq!(engine.rank("alice").await.len(), 1);

    // submit() invalidates the population snapshot, so carol shows up
    // immediately rather than after the TTL
    engine.submit("carol", &profile("Neutral")).await;
    assert_eq!(engine.rank("alice").await.len(), 2);
}

#[tokio::test]
async fn test_ranking_without_survey_has_no_answer_set() {
    let engine = Engine::new();
    engine.submit("bob", &profile("Agree")).await;

    // The endpoint turns this None into a 404
    assert!(engine
        .storage
        .load_answer_set("alice")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_schema_drift_leaves_pairs_unscorable_not_disagreeing() {
    // Two users answer a one-question catalogue; the question is then
    // retyped. Their stored values stop conforming, so the pair becomes
    // unscorable rather than scored 0.
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        br#"{"q_pets": {"label": "Pets ok?", "type": "yes_no", "weight": 1.0}}"#,
    )
    .unwrap();
    let registry = SchemaRegistry::from_file(file.path()).unwrap();

    let storage: Arc<dyn Storage> = Arc::new(MemoryStore::new());
    let ledger = MatchLedger::new(storage.clone());

    let v1 = registry.active().await;
    let raw: HashMap<String, String> = [("q_pets".to_string(), "Yes".to_string())].into();
    let set = normalize_submission(&v1, &raw, Utc::now()).unwrap();
    storage.save_answer_set("alice", &set).await.unwrap();
    storage.save_answer_set("bob", &set).await.unwrap();

    std::fs::write(
        file.path(),
        r#"{"q_pets": {"label": "How many pets?", "type": "likert_5", "weight": 1.0}}"#,
    )
    .unwrap();
    registry.reload().await.unwrap();
    let v2 = registry.active().await;

    let own = storage.load_answer_set("alice").await.unwrap().unwrap();
    let population = storage.list_answer_sets().await.unwrap();
    let ranked = rank_candidates("alice", &own, &population, &v2);

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].compatibility, None);

    // No score, no record; the pair cannot be decided on
    assert!(ledger.get("alice", "bob").await.unwrap().is_none());
    let result = ledger.decide("alice", "bob", Decision::Accepted).await;
    assert!(matches!(result, Err(LedgerError::UnknownPair)));
}
