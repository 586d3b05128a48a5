use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::thought::{Thought, ThoughtKind};

/// An ordered chain of connected reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningChain {
    /// Unique identifier.
    pub id: Uuid,
    /// Root thought the chain grew from.
    pub root: Uuid,
    /// Thoughts in insertion order, root first.
    pub thoughts: Vec<Uuid>,
    /// Synthesized conclusion, set once the chain is closed.
    pub conclusion: Option<String>,
    /// Aggregate confidence (0..=1).
    pub confidence: f32,
    /// Number of thoughts accumulated.
    pub depth: usize,
}

impl ReasoningChain {
    /// Starts a chain from a root thought.
    #[must_use]
    pub fn new(root: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            root,
            thoughts: vec![root],
            conclusion: None,
            confidence: 0.0,
            depth: 1,
        }
    }

    /// Appends a thought and refreshes the depth.
    pub fn push(&mut self, thought: Uuid) {
        self.thoughts.push(thought);
        self.depth = self.thoughts.len();
    }
}

/// Mean thought confidence plus a capped depth bonus.
#[must_use]
pub fn chain_confidence(thoughts: &[&Thought], depth: usize) -> f32 {
    if thoughts.is_empty() {
        return 0.0;
    }
    let total: f32 = thoughts.iter().map(|thought| thought.confidence).sum();
    let mean = total / thoughts.len() as f32;
    let depth_bonus = (depth as f32 * 0.05).min(0.3);
    (mean + depth_bonus).min(1.0)
}

/// Renders the chain conclusion from its member thoughts.
#[must_use]
pub fn synthesize_conclusion(thoughts: &[&Thought], depth: usize, confidence: f32) -> String {
    if thoughts.is_empty() {
        return "No conclusion reached".to_string();
    }
    let blockers = thoughts
        .iter()
        .filter(|thought| thought.kind == ThoughtKind::BlockerDetection)
        .count();
    let solutions = thoughts
        .iter()
        .filter(|thought| thought.kind == ThoughtKind::ProblemSolving)
        .count();
    let alternatives = thoughts
        .iter()
        .filter(|thought| thought.kind == ThoughtKind::AlternativePath)
        .count();
    let mut conclusion = format!("Based on {} thoughts at depth {depth}:\n", thoughts.len());
    if blockers > 0 {
        conclusion.push_str(&format!("Identified {blockers} blockers with alternatives.\n"));
    }
    if solutions > 0 {
        conclusion.push_str(&format!("Found {solutions} solution approaches.\n"));
    }
    if alternatives > 0 {
        conclusion.push_str(&format!("Generated {alternatives} alternative paths.\n"));
    }
    conclusion.push_str(&format!(
        "Conclusion: Multi-path approach with {:.1}% confidence.",
        confidence * 100.0
    ));
    conclusion
}
