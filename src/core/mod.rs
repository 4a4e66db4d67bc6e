// Core algorithm exports
pub mod answers;
pub mod matcher;
pub mod scoring;

pub use answers::{
    missing_questions, normalize_answer, normalize_submission, AnswerError, SubmitError,
};
pub use matcher::rank_candidates;
pub use scoring::{score_pair, ScoreError};
