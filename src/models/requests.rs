use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// Full questionnaire submission; raw labels, normalized server-side
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitSurveyRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    /// question id -> raw answer label as shown in the questionnaire
    #[serde(default)]
    pub answers: HashMap<String, String>,
}

/// Request to accept or deny a previously surfaced candidate
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecideRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "peer_id", rename = "peerId")]
    pub peer_id: String,
    /// "accepted" or "denied"
    pub decision: String,
}
