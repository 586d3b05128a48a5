use std::sync::Arc;

/// Sideways and analogy-driven strategies.
pub mod creative;
/// Helpers for merging expansion lists.
pub mod helper;
/// Goal-inversion strategy.
pub mod inversion;
/// Strategy trait and kind definitions.
pub mod pattern;
/// Decomposition and first-principles strategies.
pub mod structural;

use creative::{Analogical, LateralThinking};
use helper::dedup_expansions;
use inversion::ReverseEngineer;
use pattern::{ProblemStrategy, StrategyKind};
use structural::{DivideConquer, FirstPrinciples};

/// Registry of problem strategies available to the engine.
pub struct StrategyLibrary {
    strategies: Vec<Arc<dyn ProblemStrategy>>,
}

impl StrategyLibrary {
    /// Builds a library holding every built-in strategy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_kinds(&StrategyKind::all())
    }

    /// Builds a library restricted to the given kinds.
    #[must_use]
    pub fn from_kinds(kinds: &[StrategyKind]) -> Self {
        let strategies = kinds
            .iter()
            .map(|kind| -> Arc<dyn ProblemStrategy> {
                match kind {
                    StrategyKind::DivideConquer => Arc::new(DivideConquer),
                    StrategyKind::ReverseEngineer => Arc::new(ReverseEngineer),
                    StrategyKind::LateralThinking => Arc::new(LateralThinking),
                    StrategyKind::FirstPrinciples => Arc::new(FirstPrinciples),
                    StrategyKind::Analogical => Arc::new(Analogical),
                }
            })
            .collect();
        Self { strategies }
    }

    /// Number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// True when no strategy is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Expands the problem through one strategy, if registered.
    #[must_use]
    pub fn expand(&self, kind: StrategyKind, problem: &str) -> Option<Vec<String>> {
        self.strategies
            .iter()
            .find(|strategy| strategy.kind() == kind)
            .map(|strategy| strategy.expand(problem))
    }

    /// Expands the problem through every registered strategy, deduplicated.
    #[must_use]
    pub fn expand_all(&self, problem: &str) -> Vec<String> {
        let expansions = self
            .strategies
            .iter()
            .flat_map(|strategy| strategy.expand(problem))
            .collect();
        dedup_expansions(expansions)
    }
}

impl Default for StrategyLibrary {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_all_strategies() {
        let library = StrategyLibrary::with_defaults();
        assert_eq!(library.len(), 5);
        assert!(library.expand(StrategyKind::Analogical, "x").is_some());
    }

    #[test]
    fn restricted_library_misses_unregistered() {
        let library = StrategyLibrary::from_kinds(&[StrategyKind::DivideConquer]);
        assert!(library.expand(StrategyKind::LateralThinking, "x").is_none());
        assert_eq!(library.expand_all("x").len(), 3);
    }

    #[test]
    fn expand_all_merges_every_strategy() {
        let library = StrategyLibrary::with_defaults();
        let expansions = library.expand_all("scaling");
        assert_eq!(expansions.len(), 15);
    }
}
