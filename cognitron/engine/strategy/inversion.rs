use crate::strategy::pattern::{ProblemStrategy, StrategyKind};

/// Works backwards from the goal to its prerequisites.
pub struct ReverseEngineer;

impl ProblemStrategy for ReverseEngineer {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ReverseEngineer
    }

    fn expand(&self, goal: &str) -> Vec<String> {
        vec![
            format!("End goal: {goal}"),
            format!("What's needed before: {goal}"),
            format!("Prerequisites for: {goal}"),
        ]
    }
}
