//! Roomeo Algo - Compatibility scoring and matching service for the Roomeo
//! roommate app
//!
//! This library scores pairs of questionnaire answer sets, ranks candidates
//! for a user, and tracks each pair's accept/deny state. The HTTP surface in
//! the binary is a thin layer over these pieces.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize_submission, rank_candidates, score_pair, ScoreError, SubmitError};
pub use crate::models::{
    AnswerSet, AnswerValue, Decision, MatchRecord, MatchStatus, PairKey, QuestionKind,
    QuestionnaireSchema, RankedCandidate,
};
pub use crate::services::{MatchLedger, MemoryStore, PopulationCache, SchemaRegistry, Storage};
