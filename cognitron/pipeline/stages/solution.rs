use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use cognitron_engine::{StrategyLibrary, ThinkingEngine, ThoughtKind};
use tokio::sync::RwLock;

use crate::{
    intake::ProblemStatement,
    stage::{Candidate, PipelineStage, StageBaton, StageKind, StageOutput},
};

/// Produces candidate solutions by expanding the statement through the
/// configured strategy library.
pub struct SolutionGeneration {
    engine: Arc<RwLock<ThinkingEngine>>,
}

impl SolutionGeneration {
    /// Creates the stage over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<RwLock<ThinkingEngine>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PipelineStage for SolutionGeneration {
    fn kind(&self) -> StageKind {
        StageKind::SolutionGeneration
    }

    async fn run(&self, problem: &ProblemStatement, baton: &StageBaton) -> Result<StageOutput> {
        let mut engine = self.engine.write().await;
        let kinds = engine.config().strategies.clone();
        let cap = engine.config().parallel_thoughts.max(1);
        let library = StrategyLibrary::from_kinds(&kinds);
        let mut candidates: Vec<Candidate> = Vec::new();
        for kind in &kinds {
            if let Some(expansions) = library.expand(*kind, &problem.statement) {
                for summary in expansions {
                    if candidates.iter().all(|candidate| candidate.summary != summary) {
                        candidates.push(Candidate {
                            summary,
                            score: 0.5,
                            strategy: Some(*kind),
                        });
                    }
                }
            }
        }
        candidates.truncate(cap);
        if let Some(context) = baton.context {
            for candidate in &candidates {
                engine.create_thought(
                    ThoughtKind::ProblemSolving,
                    candidate.summary.clone(),
                    context,
                    1,
                    None,
                );
            }
        }
        let insights = vec![format!(
            "Generated {} candidate approaches across {} strategies",
            candidates.len(),
            kinds.len()
        )];
        let confidence = (0.4 + 0.05 * candidates.len() as f32).min(0.85);
        Ok(StageOutput {
            stage: self.kind(),
            insights,
            confidence,
            candidates,
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitron_engine::{EngineConfig, StrategyKind};

    #[tokio::test]
    async fn generation_respects_configured_strategies() {
        let config = EngineConfig {
            strategies: vec![StrategyKind::DivideConquer],
            ..EngineConfig::default()
        };
        let engine = Arc::new(RwLock::new(ThinkingEngine::with_seed(config, 2).unwrap()));
        let stage = SolutionGeneration::new(Arc::clone(&engine));
        let problem = ProblemStatement::new("speed up ci").unwrap();
        let output = stage.run(&problem, &StageBaton::default()).await.unwrap();
        assert_eq!(output.candidates.len(), 3);
        assert!(output
            .candidates
            .iter()
            .all(|candidate| candidate.strategy == Some(StrategyKind::DivideConquer)));
    }

    #[tokio::test]
    async fn generation_caps_at_parallel_thoughts() {
        let config = EngineConfig {
            parallel_thoughts: 4,
            ..EngineConfig::default()
        };
        let engine = Arc::new(RwLock::new(ThinkingEngine::with_seed(config, 2).unwrap()));
        let stage = SolutionGeneration::new(Arc::clone(&engine));
        let problem = ProblemStatement::new("speed up ci").unwrap();
        let output = stage.run(&problem, &StageBaton::default()).await.unwrap();
        assert_eq!(output.candidates.len(), 4);
    }
}
