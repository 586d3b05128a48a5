use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    /// Accepting and processing thoughts.
    Active,
    /// Halted by at least one unresolved blocker.
    Blocked,
    /// All work under the context finished.
    Completed,
}

/// A scope the engine works within.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Unique identifier.
    pub id: Uuid,
    /// Short name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Enclosing context, when nested.
    pub parent: Option<Uuid>,
    /// Nested child contexts.
    pub children: Vec<Uuid>,
    /// Thoughts currently active in this context.
    pub thoughts: IndexSet<Uuid>,
    /// Constraints bounding work in this context.
    pub constraints: Vec<String>,
    /// Goals pursued in this context.
    pub goals: Vec<String>,
    /// Free-form resources available to the context.
    pub resources: serde_json::Map<String, serde_json::Value>,
    /// Lifecycle state.
    pub status: ContextStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Context {
    /// Creates an active context.
    #[must_use]
    pub fn new(name: impl Into<String>, parent: Option<Uuid>) -> Self {
        let name = name.into();
        let description = format!("Context for {name}");
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            parent,
            children: Vec::new(),
            thoughts: IndexSet::new(),
            constraints: Vec::new(),
            goals: Vec::new(),
            resources: serde_json::Map::new(),
            status: ContextStatus::Active,
            created_at: Utc::now(),
        }
    }

    /// Registers a thought as active in this context.
    pub fn add_thought(&mut self, thought: Uuid) {
        self.thoughts.insert(thought);
    }

    /// True when the context is halted.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self.status, ContextStatus::Blocked)
    }
}
