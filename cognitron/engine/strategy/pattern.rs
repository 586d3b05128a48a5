use serde::{Deserialize, Serialize};

/// Built-in problem decomposition strategies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Split the problem into independent parts.
    DivideConquer,
    /// Walk backwards from the desired goal.
    ReverseEngineer,
    /// Approach sideways, ignoring the obvious route.
    LateralThinking,
    /// Reduce to fundamental truths and rebuild.
    FirstPrinciples,
    /// Map the problem onto a known analogue.
    Analogical,
}

impl StrategyKind {
    /// Snake-case label matching the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DivideConquer => "divide_conquer",
            Self::ReverseEngineer => "reverse_engineer",
            Self::LateralThinking => "lateral_thinking",
            Self::FirstPrinciples => "first_principles",
            Self::Analogical => "analogical",
        }
    }

    /// Every built-in strategy, in registration order.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::DivideConquer,
            Self::ReverseEngineer,
            Self::LateralThinking,
            Self::FirstPrinciples,
            Self::Analogical,
        ]
    }
}

/// A way of expanding a problem statement into candidate angles.
pub trait ProblemStrategy: Send + Sync {
    /// Which built-in strategy this implements.
    fn kind(&self) -> StrategyKind;

    /// Expands the problem into candidate statements.
    fn expand(&self, problem: &str) -> Vec<String>;
}
