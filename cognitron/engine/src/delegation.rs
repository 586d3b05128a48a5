use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    chain::ReasoningChain,
    thought::{Thought, ThoughtKind},
};

/// Lifecycle of a delegated work item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    /// Created, not yet assigned or started.
    Pending,
    /// Assigned and underway.
    InProgress,
    /// Halted on an obstruction.
    Blocked,
    /// Finished.
    Completed,
}

/// A unit of work delegated to a named resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique identifier.
    pub id: Uuid,
    /// What needs doing.
    pub description: String,
    /// Resource currently holding the item.
    pub assigned_to: Option<String>,
    /// Lifecycle state.
    pub status: WorkStatus,
    /// Context the work belongs to.
    pub context: Uuid,
    /// Items that must complete first.
    pub dependencies: Vec<Uuid>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Optional deadline.
    pub deadline: Option<DateTime<Utc>>,
    /// Scheduling priority (higher first).
    pub priority: u8,
    /// Result payload recorded on completion.
    pub result: Option<serde_json::Value>,
}

impl WorkItem {
    /// Creates a pending, unassigned item.
    #[must_use]
    pub fn new(description: impl Into<String>, context: Uuid, priority: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            assigned_to: None,
            status: WorkStatus::Pending,
            context,
            dependencies: Vec::new(),
            created_at: Utc::now(),
            deadline: None,
            priority,
            result: None,
        }
    }
}

/// Extracts work items from a chain's actionable thoughts.
///
/// Thoughts flagged `action_required` or of a problem-solving/delegation kind
/// become items; a chain with none of those but a conclusion yields one item
/// built from the conclusion.
#[must_use]
pub fn work_items_from_chain(
    chain: &ReasoningChain,
    thoughts: &[&Thought],
    context: Uuid,
) -> Vec<WorkItem> {
    let mut items: Vec<WorkItem> = thoughts
        .iter()
        .filter(|thought| {
            thought.action_required
                || matches!(
                    thought.kind,
                    ThoughtKind::ProblemSolving | ThoughtKind::Delegation
                )
        })
        .map(|thought| WorkItem::new(thought.content.clone(), context, thought.priority))
        .collect();
    if items.is_empty() {
        if let Some(conclusion) = &chain.conclusion {
            items.push(WorkItem::new(conclusion.clone(), context, 5));
        }
    }
    items
}

/// Assigns items round-robin over the resource names.
///
/// Assigned items move to `InProgress`; the returned map records item → owner.
pub fn assign_round_robin(
    items: &mut [WorkItem],
    resources: &[String],
) -> IndexMap<Uuid, String> {
    let mut delegation = IndexMap::new();
    if resources.is_empty() {
        return delegation;
    }
    for (idx, item) in items.iter_mut().enumerate() {
        let owner = resources[idx % resources.len()].clone();
        item.assigned_to = Some(owner.clone());
        item.status = WorkStatus::InProgress;
        delegation.insert(item.id, owner);
    }
    delegation
}
