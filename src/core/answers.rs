use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::models::domain::{AnswerSet, AnswerValue};
use crate::models::schema::{QuestionKind, QuestionnaireSchema};

/// A single raw answer that could not be normalized
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnswerError {
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),
    #[error("empty answer for scored question {0}")]
    EmptyAnswer(String),
    #[error("invalid {kind} answer for question {question_id}: {raw:?}")]
    InvalidLabel {
        question_id: String,
        kind: QuestionKind,
        raw: String,
    },
}

/// Why a full submission was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("submission is missing {} scored question(s)", .0.len())]
    Incomplete(Vec<String>),
    #[error(transparent)]
    Invalid(#[from] AnswerError),
}

/// Normalize one raw label for a question of `kind`.
///
/// Matching is trim- and ASCII-case-insensitive, so "  yes " and "YES" both
/// map to the same value. Returns `None` when the label is not part of the
/// kind's label set.
pub fn normalize_answer(kind: QuestionKind, raw: &str) -> Option<AnswerValue> {
    let label = raw.trim();
    match kind {
        QuestionKind::YesNo => parse_yes_no(label).map(AnswerValue::Bool),
        QuestionKind::Likert5 => parse_likert(label).map(AnswerValue::Likert),
        QuestionKind::Frequency4 => parse_frequency(label).map(AnswerValue::Frequency),
        QuestionKind::FreeText => Some(AnswerValue::Text(label.to_string())),
    }
}

/// Scored questions present in the schema but absent from `raw`, sorted.
/// Free-text questions are optional and never reported here.
pub fn missing_questions(
    schema: &QuestionnaireSchema,
    raw: &HashMap<String, String>,
) -> Vec<String> {
    schema
        .scored_questions()
        .filter(|(id, _)| !raw.contains_key(*id))
        .map(|(id, _)| id.to_string())
        .collect()
}

/// Validate and normalize a full questionnaire submission.
///
/// Completeness is checked first: every scored question must be answered.
/// Each provided answer is then normalized in question-id order, so the
/// first error reported is deterministic. Blank free-text answers are
/// dropped rather than stored.
pub fn normalize_submission(
    schema: &QuestionnaireSchema,
    raw: &HashMap<String, String>,
    submitted_at: DateTime<Utc>,
) -> Result<AnswerSet, SubmitError> {
    let missing = missing_questions(schema, raw);
    if !missing.is_empty() {
        return Err(SubmitError::Incomplete(missing));
    }

    // Sort the submission so validation order does not depend on HashMap
    // iteration
    let ordered: BTreeMap<&str, &str> = raw
        .iter()
        .map(|(id, value)| (id.as_str(), value.as_str()))
        .collect();

    let mut answers = BTreeMap::new();
    for (id, value) in ordered {
        let question = schema
            .get(id)
            .ok_or_else(|| AnswerError::UnknownQuestion(id.to_string()))?;

        let label = value.trim();
        if label.is_empty() {
            if question.kind == QuestionKind::FreeText {
                continue;
            }
            return Err(SubmitError::Invalid(AnswerError::EmptyAnswer(
                id.to_string(),
            )));
        }

        let normalized =
            normalize_answer(question.kind, label).ok_or_else(|| AnswerError::InvalidLabel {
                question_id: id.to_string(),
                kind: question.kind,
                raw: value.to_string(),
            })?;
        answers.insert(id.to_string(), normalized);
    }

    Ok(AnswerSet::new(answers, submitted_at))
}

#[inline]
fn parse_yes_no(label: &str) -> Option<bool> {
    if label.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if label.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

#[inline]
fn parse_likert(label: &str) -> Option<u8> {
    const LABELS: [&str; 5] = [
        "Strongly Disagree",
        "Disagree",
        "Neutral",
        "Agree",
        "Strongly Agree",
    ];
    LABELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(label))
        .map(|i| i as u8 + 1)
}

#[inline]
fn parse_frequency(label: &str) -> Option<u8> {
    const LABELS: [&str; 4] = ["Never", "Sometimes", "Often", "Always"];
    LABELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(label))
        .map(|i| i as u8 + 1)
}
