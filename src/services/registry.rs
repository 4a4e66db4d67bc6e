use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::schema::{Question, QuestionnaireSchema, SchemaError};

/// Errors loading or reloading a questionnaire definition
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read questionnaire file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse questionnaire file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Holds the active questionnaire schema and swaps it on reload.
///
/// The file (when configured) is a JSON map of question id to
/// `{label, type, weight}`. A reload validates the new catalogue fully
/// before swapping; on any failure the previous schema stays active.
/// In-flight requests keep the `Arc` they already took, so a swap never
/// changes a computation midway.
pub struct SchemaRegistry {
    source: Option<PathBuf>,
    active: RwLock<Arc<QuestionnaireSchema>>,
}

impl SchemaRegistry {
    /// Registry over the built-in questionnaire; reload re-activates it.
    pub fn builtin() -> Self {
        Self {
            source: None,
            active: RwLock::new(Arc::new(QuestionnaireSchema::builtin())),
        }
    }

    /// Registry over a questionnaire file, loaded and validated now.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let schema = load_schema_file(&path)?;
        Ok(Self {
            source: Some(path),
            active: RwLock::new(Arc::new(schema)),
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The current schema. Cheap; callers hold the `Arc` for the duration
    /// of one computation so a concurrent reload cannot shear it.
    pub async fn active(&self) -> Arc<QuestionnaireSchema> {
        self.active.read().await.clone()
    }

    /// Re-read the questionnaire source and swap it in, returning the new
    /// question count. Stored answers are untouched; values that no longer
    /// conform to a retyped question simply stop contributing to scores.
    pub async fn reload(&self) -> Result<usize, RegistryError> {
        let schema = match &self.source {
            Some(path) => load_schema_file(path)?,
            None => QuestionnaireSchema::builtin(),
        };
        let count = schema.len();

        let mut active = self.active.write().await;
        *active = Arc::new(schema);

        tracing::info!("Questionnaire schema reloaded ({} questions)", count);

        Ok(count)
    }
}

fn load_schema_file(path: &Path) -> Result<QuestionnaireSchema, RegistryError> {
    let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let questions: BTreeMap<String, Question> =
        serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    Ok(QuestionnaireSchema::new(questions)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_questionnaire(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_builtin_registry_serves_default_catalogue() {
        let registry = SchemaRegistry::builtin();
        assert!(registry.source().is_none());

        let schema = registry.active().await;
        assert!(!schema.is_empty());
        assert!(schema.get("q_smoking").is_some());
    }

    #[tokio::test]
    async fn test_file_registry_loads_and_reloads() {
        let file = write_questionnaire(
            r#"{"q_pets": {"label": "Pets ok?", "type": "yes_no", "weight": 1.0}}"#,
        );
        let registry = SchemaRegistry::from_file(file.path()).unwrap();
        assert_eq!(registry.active().await.len(), 1);

        std::fs::write(
            file.path(),
            r#"{
                "q_pets": {"label": "Pets ok?", "type": "yes_no", "weight": 1.0},
                "q_tidy": {"label": "Tidy?", "type": "likert_5", "weight": 2.0}
            }"#,
        )
        .unwrap();

        assert_eq!(registry.reload().await.unwrap(), 2);
        assert_eq!(registry.active().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_schema() {
        let file = write_questionnaire(
            r#"{"q_pets": {"label": "Pets ok?", "type": "yes_no", "weight": 1.0}}"#,
        );
        let registry = SchemaRegistry::from_file(file.path()).unwrap();

        std::fs::write(file.path(), "{not json").unwrap();

        assert!(matches!(
            registry.reload().await,
            Err(RegistryError::Parse { .. })
        ));
        assert_eq!(registry.active().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_catalogue_is_rejected_at_load() {
        let file = write_questionnaire(
            r#"{"q_bad": {"label": "Bad", "type": "likert_5", "weight": -2.0}}"#,
        );
        assert!(matches!(
            SchemaRegistry::from_file(file.path()),
            Err(RegistryError::Schema(_))
        ));
    }
}
