use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of thoughts the engine can hold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    /// Breaking a topic into parts.
    Analysis,
    /// Forward planning.
    Planning,
    /// Searching for a solution.
    ProblemSolving,
    /// Associating with other thoughts.
    Connection,
    /// An obstruction that halts progress.
    BlockerDetection,
    /// A workaround for a blocker.
    AlternativePath,
    /// Working backwards from a goal.
    ReverseEngineering,
    /// Surfacing risks.
    RiskAssessment,
    /// Improving an existing approach.
    Optimization,
    /// Handing work to a resource.
    Delegation,
    /// Watching delegated work.
    Monitoring,
    /// Moving between contexts.
    ContextSwitching,
    /// Recognizing a known shape.
    PatternMatching,
    /// A tentative explanation.
    Hypothesis,
    /// Checking a hypothesis.
    Validation,
}

impl ThoughtKind {
    /// Snake-case label matching the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Planning => "planning",
            Self::ProblemSolving => "problem_solving",
            Self::Connection => "connection",
            Self::BlockerDetection => "blocker_detection",
            Self::AlternativePath => "alternative_path",
            Self::ReverseEngineering => "reverse_engineering",
            Self::RiskAssessment => "risk_assessment",
            Self::Optimization => "optimization",
            Self::Delegation => "delegation",
            Self::Monitoring => "monitoring",
            Self::ContextSwitching => "context_switching",
            Self::PatternMatching => "pattern_matching",
            Self::Hypothesis => "hypothesis",
            Self::Validation => "validation",
        }
    }

    /// Priority assigned to freshly created thoughts of this kind.
    #[must_use]
    pub const fn default_priority(self) -> u8 {
        match self {
            Self::BlockerDetection => 9,
            Self::ProblemSolving => 8,
            Self::AlternativePath => 7,
            _ => 5,
        }
    }
}

/// Words that mark a thought's content as blocking.
const BLOCKER_MARKERS: [&str; 10] = [
    "cannot", "unable", "blocked", "failed", "error", "missing", "required", "depends", "waiting",
    "stuck",
];

/// True when the content reads like an obstruction.
#[must_use]
pub fn content_signals_blocker(content: &str) -> bool {
    let lower = content.to_lowercase();
    BLOCKER_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Phrases a derived thought from its parent content and perspective.
#[must_use]
pub fn perspective_content(parent_content: &str, perspective: ThoughtKind) -> String {
    match perspective {
        ThoughtKind::Analysis => format!("Breaking down: {parent_content}"),
        ThoughtKind::ProblemSolving => format!("How to solve: {parent_content}"),
        ThoughtKind::Connection => format!("This relates to: {parent_content}"),
        ThoughtKind::ReverseEngineering => format!("Working backwards from: {parent_content}"),
        ThoughtKind::RiskAssessment => format!("Risks in: {parent_content}"),
        ThoughtKind::Optimization => format!("Optimizing: {parent_content}"),
        ThoughtKind::AlternativePath => format!("Alternative to: {parent_content}"),
        _ => format!("Considering: {parent_content}"),
    }
}

/// A single thought held by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought {
    /// Unique identifier.
    pub id: Uuid,
    /// Kind of thought.
    pub kind: ThoughtKind,
    /// Textual content.
    pub content: String,
    /// Context this thought belongs to.
    pub context: Uuid,
    /// Nesting depth below the chain root.
    pub depth: u32,
    /// Parent thought, when derived.
    pub parent: Option<Uuid>,
    /// Derived child thoughts.
    pub children: Vec<Uuid>,
    /// Discovered associations to other thoughts.
    pub links: Vec<Uuid>,
    /// Confidence in this thought (0..=1).
    pub confidence: f32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Whether the thought has been settled.
    pub resolved: bool,
    /// Whether the thought demands follow-up work.
    pub action_required: bool,
    /// Scheduling priority (higher first).
    pub priority: u8,
}

impl Thought {
    /// Creates a thought with kind-derived priority and default confidence.
    #[must_use]
    pub fn new(
        kind: ThoughtKind,
        content: impl Into<String>,
        context: Uuid,
        depth: u32,
        parent: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content: content.into(),
            context,
            depth,
            parent,
            children: Vec::new(),
            links: Vec::new(),
            confidence: 0.5,
            created_at: Utc::now(),
            resolved: false,
            action_required: false,
            priority: kind.default_priority(),
        }
    }

    /// True for unresolved blocker-detection thoughts.
    #[must_use]
    pub fn is_blocker(&self) -> bool {
        self.kind == ThoughtKind::BlockerDetection && !self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_follow_kind() {
        assert_eq!(ThoughtKind::BlockerDetection.default_priority(), 9);
        assert_eq!(ThoughtKind::ProblemSolving.default_priority(), 8);
        assert_eq!(ThoughtKind::AlternativePath.default_priority(), 7);
        assert_eq!(ThoughtKind::Hypothesis.default_priority(), 5);
    }

    #[test]
    fn blocker_detection_requires_unresolved() {
        let context = Uuid::new_v4();
        let mut thought = Thought::new(ThoughtKind::BlockerDetection, "stuck", context, 1, None);
        assert!(thought.is_blocker());
        thought.resolved = true;
        assert!(!thought.is_blocker());
    }

    #[test]
    fn marker_words_flag_content() {
        assert!(content_signals_blocker("deployment FAILED on staging"));
        assert!(content_signals_blocker("waiting on upstream review"));
        assert!(!content_signals_blocker("all systems nominal"));
    }

    #[test]
    fn perspective_templates_render() {
        assert_eq!(
            perspective_content("ship v2", ThoughtKind::Analysis),
            "Breaking down: ship v2"
        );
        assert_eq!(
            perspective_content("ship v2", ThoughtKind::Planning),
            "Considering: ship v2"
        );
    }
}
