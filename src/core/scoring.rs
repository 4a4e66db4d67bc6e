use thiserror::Error;

use crate::models::domain::{AnswerSet, AnswerValue};
use crate::models::schema::{QuestionKind, QuestionnaireSchema};

/// Scoring failed because the pair has nothing comparable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("no scorable questions answered by both users")]
    InsufficientOverlap,
}

/// Calculate a compatibility score (0-100) for a pair of answer sets
///
/// Scoring formula:
/// score = 100 * sum(weight_q * agreement_q) / sum(weight_q)
///
/// summed over every scored question answered by BOTH users with values
/// that still conform to the question's current kind. Agreement per kind:
///     YesNo       1.0 if equal, else 0.0
///     Likert5     1 - |a - b| / 4
///     Frequency4  1 - |a - b| / 3
///
/// Free-text questions never contribute. A question answered by only one
/// user (or whose stored value no longer matches a retyped question) is
/// skipped entirely rather than counted as disagreement. When nothing is
/// comparable, or every comparable question has weight 0, the score is
/// undefined and `InsufficientOverlap` is returned.
pub fn score_pair(
    a: &AnswerSet,
    b: &AnswerSet,
    schema: &QuestionnaireSchema,
) -> Result<f64, ScoreError> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;

    for (id, question) in schema.scored_questions() {
        let (Some(value_a), Some(value_b)) = (a.get(id), b.get(id)) else {
            continue;
        };
        if !value_a.conforms_to(question.kind) || !value_b.conforms_to(question.kind) {
            continue;
        }
        let Some(agree) = agreement(question.kind, value_a, value_b) else {
            continue;
        };

        weighted_sum += question.weight * agree;
        weight_total += question.weight;
    }

    if weight_total <= 0.0 {
        return Err(ScoreError::InsufficientOverlap);
    }

    Ok(100.0 * weighted_sum / weight_total)
}

/// Per-question agreement (0-1); `None` when the values cannot be compared
/// under this kind
#[inline]
fn agreement(kind: QuestionKind, a: &AnswerValue, b: &AnswerValue) -> Option<f64> {
    match (kind, a, b) {
        (QuestionKind::YesNo, AnswerValue::Bool(x), AnswerValue::Bool(y)) => {
            Some(if x == y { 1.0 } else { 0.0 })
        }
        (QuestionKind::Likert5, AnswerValue::Likert(x), AnswerValue::Likert(y))
        | (QuestionKind::Frequency4, AnswerValue::Frequency(x), AnswerValue::Frequency(y)) => {
            let span = f64::from(kind.scale_max()? - 1);
            Some(scale_agreement(*x, *y, span))
        }
        _ => None,
    }
}

/// Linear agreement on an ordinal scale: identical answers give 1.0, the
/// two extremes give 0.0
#[inline]
fn scale_agreement(x: u8, y: u8, span: f64) -> f64 {
    1.0 - (x as f64 - y as f64).abs() / span
}
