use std::cmp::Ordering;

use crate::core::scoring::score_pair;
use crate::models::domain::{AnswerSet, RankedCandidate};
use crate::models::schema::QuestionnaireSchema;

/// Rank every other user in the population against `user_id`
///
/// # Ordering
/// 1. Defined compatibility, descending
/// 2. Undefined compatibility (no scorable overlap) after all defined ones
/// 3. Peer id ascending as the tiebreak, so equal scores always come back
///    in the same order
///
/// The viewer is never their own candidate. A peer with no scorable overlap
/// is kept in the list with `compatibility: None` rather than silently
/// dropped, so the caller can still surface them.
pub fn rank_candidates(
    user_id: &str,
    own_answers: &AnswerSet,
    population: &[(String, AnswerSet)],
    schema: &QuestionnaireSchema,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = population
        .iter()
        .filter(|(peer_id, _)| peer_id != user_id)
        .map(|(peer_id, peer_answers)| RankedCandidate {
            peer_id: peer_id.clone(),
            compatibility: score_pair(own_answers, peer_answers, schema).ok(),
        })
        .collect();

    ranked.sort_by(|x, y| match (x.compatibility, y.compatibility) {
        (Some(a), Some(b)) => b
            .partial_cmp(&a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| x.peer_id.cmp(&y.peer_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => x.peer_id.cmp(&y.peer_id),
    });

    ranked
}
