use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::schema::QuestionKind;

/// A normalized answer, already validated against its question's kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// YesNo answer
    Bool(bool),
    /// Likert5 answer, 1 (Strongly Disagree) ..= 5 (Strongly Agree)
    Likert(u8),
    /// Frequency4 answer, 1 (Never) ..= 4 (Always)
    Frequency(u8),
    /// FreeText answer; stored but never scored
    Text(String),
}

impl AnswerValue {
    /// Whether this stored value is still valid for a question of `kind`.
    ///
    /// A question that was retyped after answers were recorded leaves the old
    /// values non-conforming; scoring treats those as unanswered rather than
    /// as disagreement.
    pub fn conforms_to(&self, kind: QuestionKind) -> bool {
        match (self, kind) {
            (AnswerValue::Bool(_), QuestionKind::YesNo) => true,
            (AnswerValue::Likert(v), QuestionKind::Likert5) => (1..=5).contains(v),
            (AnswerValue::Frequency(v), QuestionKind::Frequency4) => (1..=4).contains(v),
            (AnswerValue::Text(_), QuestionKind::FreeText) => true,
            _ => false,
        }
    }
}

/// One user's normalized questionnaire responses.
///
/// Created on first complete submission and replaced wholesale on
/// resubmission; there is no partial merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub answers: BTreeMap<String, AnswerValue>,
    #[serde(rename = "submittedAt")]
    pub submitted_at: DateTime<Utc>,
}

impl AnswerSet {
    pub fn new(answers: BTreeMap<String, AnswerValue>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            answers,
            submitted_at,
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Canonical unordered user pair: `a` is always the lexicographically
/// smaller id, so each pair has exactly one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    a: String,
    b: String,
}

impl PairKey {
    /// Canonicalize two distinct user ids; `None` when they are equal.
    pub fn new(x: &str, y: &str) -> Option<Self> {
        match x.cmp(y) {
            std::cmp::Ordering::Less => Some(Self {
                a: x.to_string(),
                b: y.to_string(),
            }),
            std::cmp::Ordering::Greater => Some(Self {
                a: y.to_string(),
                b: x.to_string(),
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn a(&self) -> &str {
        &self.a
    }

    pub fn b(&self) -> &str {
        &self.b
    }
}

/// One user's directed decision state about a peer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Denied,
}

/// An explicit accept/deny action (Pending is never a decision)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Accepted,
    Denied,
}

impl Decision {
    pub fn as_status(self) -> MatchStatus {
        match self {
            Decision::Accepted => MatchStatus::Accepted,
            Decision::Denied => MatchStatus::Denied,
        }
    }
}

/// Match state for one user pair.
///
/// `status_a` is the decision made BY `pair.a` ABOUT `pair.b`, and
/// `status_b` the reverse. Mutuality is derived on read and never stored,
/// so the two halves cannot desync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub pair: PairKey,
    pub compatibility: f64,
    #[serde(rename = "statusA")]
    pub status_a: MatchStatus,
    #[serde(rename = "statusB")]
    pub status_b: MatchStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Fresh record with both halves pending.
    pub fn new(pair: PairKey, compatibility: f64, now: DateTime<Utc>) -> Self {
        Self {
            pair,
            compatibility,
            status_a: MatchStatus::Pending,
            status_b: MatchStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// The directed status owned by `user_id`; `None` if they are not in
    /// this pair.
    pub fn status_of(&self, user_id: &str) -> Option<MatchStatus> {
        if self.pair.a == user_id {
            Some(self.status_a)
        } else if self.pair.b == user_id {
            Some(self.status_b)
        } else {
            None
        }
    }

    /// Overwrite `user_id`'s own half. Returns false (and changes nothing)
    /// when `user_id` is not part of the pair; there is deliberately no way
    /// to address the counterpart's half.
    pub fn set_status(&mut self, user_id: &str, status: MatchStatus) -> bool {
        if self.pair.a == user_id {
            self.status_a = status;
            true
        } else if self.pair.b == user_id {
            self.status_b = status;
            true
        } else {
            false
        }
    }

    /// Both halves accepted.
    pub fn mutual(&self) -> bool {
        self.status_a == MatchStatus::Accepted && self.status_b == MatchStatus::Accepted
    }
}

/// One ranked peer as produced by the matcher; `None` compatibility means
/// the pair had no comparable questions (undefined, not zero)
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub peer_id: String,
    pub compatibility: Option<f64>,
}
