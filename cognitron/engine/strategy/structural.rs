use crate::strategy::pattern::{ProblemStrategy, StrategyKind};

/// Splits a problem into a fixed number of parts.
pub struct DivideConquer;

impl ProblemStrategy for DivideConquer {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DivideConquer
    }

    fn expand(&self, problem: &str) -> Vec<String> {
        (1..=3).map(|part| format!("Part {part} of {problem}")).collect()
    }
}

/// Rebuilds a problem from fundamental truths.
pub struct FirstPrinciples;

impl ProblemStrategy for FirstPrinciples {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FirstPrinciples
    }

    fn expand(&self, problem: &str) -> Vec<String> {
        vec![
            format!("Fundamental truth about {problem}"),
            format!("Core components of {problem}"),
            format!("Basic building blocks of {problem}"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_produces_three_parts() {
        let parts = DivideConquer.expand("cache design");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "Part 1 of cache design");
    }

    #[test]
    fn first_principles_names_fundamentals() {
        let lines = FirstPrinciples.expand("cache design");
        assert!(lines[0].starts_with("Fundamental truth"));
        assert_eq!(lines.len(), 3);
    }
}
