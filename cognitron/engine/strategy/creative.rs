use crate::strategy::pattern::{ProblemStrategy, StrategyKind};

/// Approaches the problem sideways instead of head-on.
pub struct LateralThinking;

impl ProblemStrategy for LateralThinking {
    fn kind(&self) -> StrategyKind {
        StrategyKind::LateralThinking
    }

    fn expand(&self, problem: &str) -> Vec<String> {
        vec![
            format!("Alternative view of {problem}"),
            format!("Unrelated solution to {problem}"),
            format!("Creative approach to {problem}"),
        ]
    }
}

/// Maps the problem onto familiar patterns.
pub struct Analogical;

impl ProblemStrategy for Analogical {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Analogical
    }

    fn expand(&self, problem: &str) -> Vec<String> {
        vec![
            format!("This is like: {problem}"),
            format!("Similar pattern to {problem}"),
            format!("Reminds me of {problem}"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lateral_offers_alternatives() {
        let angles = LateralThinking.expand("slow queries");
        assert_eq!(angles[0], "Alternative view of slow queries");
    }

    #[test]
    fn analogies_reference_known_shapes() {
        let angles = Analogical.expand("slow queries");
        assert!(angles.iter().any(|line| line.contains("Similar pattern")));
    }
}
