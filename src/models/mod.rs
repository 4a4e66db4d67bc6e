// Model exports
pub mod domain;
pub mod requests;
pub mod responses;
pub mod schema;

pub use domain::{
    AnswerSet, AnswerValue, Decision, MatchRecord, MatchStatus, PairKey, RankedCandidate,
};
pub use requests::{DecideRequest, SubmitSurveyRequest};
pub use responses::{
    ErrorResponse, HealthResponse, MatchEntry, MatchRecordView, MatchesResponse, ReloadResponse,
    SubmitSurveyResponse,
};
pub use schema::{Question, QuestionKind, QuestionnaireSchema, SchemaError};
