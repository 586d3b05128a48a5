use chrono::{DateTime, Utc};
use cognitron_engine::EngineError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A problem submitted for reasoning, with its surrounding context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemStatement {
    /// Unique identifier.
    pub id: Uuid,
    /// The problem text.
    pub statement: String,
    /// Free-form context mapping supplied by the caller.
    pub context: serde_json::Map<String, serde_json::Value>,
    /// Domains the caller considers relevant.
    pub domains: Vec<String>,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

impl ProblemStatement {
    /// Validates and wraps a problem statement.
    pub fn new(statement: impl Into<String>) -> Result<Self, EngineError> {
        let statement = statement.into();
        if statement.trim().is_empty() {
            return Err(EngineError::Validation(
                "problem statement must not be empty".into(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            statement,
            context: serde_json::Map::new(),
            domains: Vec::new(),
            submitted_at: Utc::now(),
        })
    }

    /// Attaches a context mapping.
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Map<String, serde_json::Value>) -> Self {
        self.context = context;
        self
    }

    /// Attaches relevant domains.
    #[must_use]
    pub fn with_domains(mut self, domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }
}
