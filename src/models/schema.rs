use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when building or validating a questionnaire
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("questionnaire catalogue is empty")]
    EmptyCatalogue,

    #[error("question id must not be empty")]
    EmptyQuestionId,

    #[error("question {0} has an empty label")]
    EmptyLabel(String),

    #[error("question {id} has invalid weight {weight} (must be finite and >= 0)")]
    InvalidWeight { id: String, weight: f64 },
}

/// Answer type of a question, driving both normalization and scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    #[serde(rename = "yes_no")]
    YesNo,
    #[serde(rename = "likert_5")]
    Likert5,
    #[serde(rename = "frequency_4")]
    Frequency4,
    #[serde(rename = "free_text")]
    FreeText,
}

impl QuestionKind {
    /// FreeText answers are never scored and never required.
    pub fn is_scored(&self) -> bool {
        !matches!(self, QuestionKind::FreeText)
    }

    /// Top of the 1-based answer scale, for the scale kinds.
    pub fn scale_max(&self) -> Option<u8> {
        match self {
            QuestionKind::Likert5 => Some(5),
            QuestionKind::Frequency4 => Some(4),
            QuestionKind::YesNo | QuestionKind::FreeText => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::YesNo => "yes_no",
            QuestionKind::Likert5 => "likert_5",
            QuestionKind::Frequency4 => "frequency_4",
            QuestionKind::FreeText => "free_text",
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single questionnaire entry; the id is the catalogue map key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub weight: f64,
}

/// The active questionnaire: the process-wide catalogue of questions.
///
/// Loaded once at startup (file or built-in) and treated as immutable;
/// swapping in a new catalogue goes through the schema registry. Keyed by
/// question id so iteration order is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionnaireSchema {
    questions: BTreeMap<String, Question>,
}

impl QuestionnaireSchema {
    /// Build a validated schema from a raw catalogue map.
    pub fn new(questions: BTreeMap<String, Question>) -> Result<Self, SchemaError> {
        let schema = Self { questions };
        schema.validate()?;
        Ok(schema)
    }

    /// Check catalogue invariants: non-empty ids and labels, finite
    /// non-negative weights, at least one question.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.questions.is_empty() {
            return Err(SchemaError::EmptyCatalogue);
        }
        for (id, question) in &self.questions {
            if id.trim().is_empty() {
                return Err(SchemaError::EmptyQuestionId);
            }
            if question.label.trim().is_empty() {
                return Err(SchemaError::EmptyLabel(id.clone()));
            }
            if !question.weight.is_finite() || question.weight < 0.0 {
                return Err(SchemaError::InvalidWeight {
                    id: id.clone(),
                    weight: question.weight,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.questions.get(question_id)
    }

    /// All questions in id order.
    pub fn questions(&self) -> impl Iterator<Item = (&str, &Question)> {
        self.questions.iter().map(|(id, q)| (id.as_str(), q))
    }

    /// Questions that participate in scoring and completeness checks.
    pub fn scored_questions(&self) -> impl Iterator<Item = (&str, &Question)> {
        self.questions().filter(|(_, q)| q.kind.is_scored())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The built-in roommate questionnaire.
    ///
    /// This is the single authoritative fallback catalogue; no other
    /// component carries its own copy.
    pub fn builtin() -> Self {
        fn q(label: &str, kind: QuestionKind, weight: f64) -> Question {
            Question {
                label: label.to_string(),
                kind,
                weight,
            }
        }

        use QuestionKind::{FreeText, Frequency4, Likert5, YesNo};

        #[rustfmt::skip]
        let questions = BTreeMap::from([
            ("q_smoking".to_string(), q("Do you smoke?", YesNo, 1.0)),
            ("q_pets".to_string(), q("Do you have pets?", YesNo, 1.0)),
            ("q_clean_freq".to_string(), q("How often do you clean?", Frequency4, 1.0)),
            ("q_social".to_string(), q("I like having friends over.", Likert5, 1.0)),
            ("q_noise".to_string(), q("I don't mind loud music.", Likert5, 1.0)),
            ("q_quiet_hours".to_string(), q("Should we have quiet hours?", YesNo, 1.0)),
            ("q_shared_food".to_string(), q("Are you ok with shared groceries?", YesNo, 1.0)),
            ("q_lifestyle".to_string(), q("Describe your lifestyle (optional).", FreeText, 0.5)),
            ("q_sleep_schedule".to_string(), q("I prefer to go to bed early.", Likert5, 1.0)),
            ("q_noise_tolerance".to_string(), q("I am comfortable with background noise.", Likert5, 1.0)),
            ("q_alcohol".to_string(), q("Are you okay with alcohol being consumed in the home?", YesNo, 1.0)),
            ("q_share_chores".to_string(), q("Are you willing to share chores fairly?", YesNo, 1.0)),
            ("q_temperature_pref".to_string(), q("I prefer a cooler apartment (lower thermostat).", Likert5, 1.0)),
            ("q_vehicle".to_string(), q("Do you have a vehicle (optional comments)?", FreeText, 0.5)),
            ("q_overnight_guests".to_string(), q("How often do you have overnight guests?", Frequency4, 1.0)),
            ("q_shared_groceries".to_string(), q("I am open to sharing kitchen appliances and cookware.", Likert5, 0.8)),
            ("q_work_from_home".to_string(), q("How often do you work/study from home?", Frequency4, 0.9)),
            ("q_morning_routine".to_string(), q("I need the bathroom for a long time in the morning.", Likert5, 0.7)),
            ("q_social_events".to_string(), q("How often do you attend social events outside the home?", Frequency4, 0.8)),
            ("q_tv_music".to_string(), q("I often play music or watch TV in common areas.", Likert5, 0.9)),
            ("q_visitors_notice".to_string(), q("Should roommates give advance notice before having visitors?", YesNo, 1.0)),
            ("q_decorating".to_string(), q("I like to personalize and decorate shared spaces.", Likert5, 0.6)),
            ("q_conflict_style".to_string(), q("I prefer to address conflicts directly rather than avoid them.", Likert5, 1.0)),
            ("q_budget_conscious".to_string(), q("I am budget-conscious with utilities and shared expenses.", Likert5, 0.9)),
        ]);

        Self { questions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_is_valid() {
        let schema = QuestionnaireSchema::builtin();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.len(), 24);

        // Two optional free-text questions, the rest scored
        let scored = schema.scored_questions().count();
        assert_eq!(scored, 22);
    }

    #[test]
    fn test_empty_catalogue_rejected() {
        let result = QuestionnaireSchema::new(BTreeMap::new());
        assert!(matches!(result, Err(SchemaError::EmptyCatalogue)));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let questions = BTreeMap::from([(
            "q_bad".to_string(),
            Question {
                label: "Bad weight".to_string(),
                kind: QuestionKind::YesNo,
                weight: -1.0,
            },
        )]);

        let result = QuestionnaireSchema::new(questions);
        assert!(matches!(result, Err(SchemaError::InvalidWeight { .. })));
    }

    #[test]
    fn test_nan_weight_rejected() {
        let questions = BTreeMap::from([(
            "q_nan".to_string(),
            Question {
                label: "NaN weight".to_string(),
                kind: QuestionKind::Likert5,
                weight: f64::NAN,
            },
        )]);

        assert!(QuestionnaireSchema::new(questions).is_err());
    }

    #[test]
    fn test_kind_serde_labels() {
        assert_eq!(
            serde_json::to_string(&QuestionKind::YesNo).unwrap(),
            "\"yes_no\""
        );
        assert_eq!(
            serde_json::from_str::<QuestionKind>("\"likert_5\"").unwrap(),
            QuestionKind::Likert5
        );
        assert_eq!(
            serde_json::from_str::<QuestionKind>("\"frequency_4\"").unwrap(),
            QuestionKind::Frequency4
        );
    }

    #[test]
    fn test_schema_round_trips_as_plain_map() {
        let schema = QuestionnaireSchema::builtin();
        let json = serde_json::to_value(&schema).unwrap();

        // Wire shape is {id: {label, type, weight}} with no wrapper object
        assert!(json.get("q_smoking").is_some());
        assert_eq!(json["q_smoking"]["type"], "yes_no");
        assert_eq!(json["q_lifestyle"]["type"], "free_text");

        let parsed: QuestionnaireSchema = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.len(), schema.len());
    }
}
