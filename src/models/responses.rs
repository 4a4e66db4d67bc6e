use serde::{Deserialize, Serialize};

use crate::models::domain::{MatchRecord, MatchStatus};

/// Acknowledgement for a stored questionnaire submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitSurveyResponse {
    pub ok: bool,
    /// how many answers were stored after normalization
    pub answered: usize,
}

/// One ranked candidate as returned to the viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntry {
    #[serde(rename = "peerId")]
    pub peer_id: String,
    /// null when the pair shares no scorable questions
    pub compatibility: Option<f64>,
    /// the viewer's own decision about this peer
    pub status: MatchStatus,
    pub mutual: bool,
}

/// Response for the ranked matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub matches: Vec<MatchEntry>,
    pub total: usize,
}

/// Full pair state, returned after a decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecordView {
    #[serde(rename = "userA")]
    pub user_a: String,
    #[serde(rename = "userB")]
    pub user_b: String,
    pub compatibility: f64,
    #[serde(rename = "statusA")]
    pub status_a: MatchStatus,
    #[serde(rename = "statusB")]
    pub status_b: MatchStatus,
    pub mutual: bool,
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&MatchRecord> for MatchRecordView {
    fn from(record: &MatchRecord) -> Self {
        Self {
            user_a: record.pair.a().to_string(),
            user_b: record.pair.b().to_string(),
            compatibility: record.compatibility,
            status_a: record.status_a,
            status_b: record.status_b,
            mutual: record.mutual(),
            updated_at: record.updated_at,
        }
    }
}

/// Acknowledgement for a questionnaire schema reload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub questions: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    /// per-field detail, e.g. the ids missing from a submission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = Some(details);
        self
    }
}
