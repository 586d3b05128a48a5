use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use cognitron_engine::ThinkingEngine;
use tokio::sync::RwLock;

use crate::{
    intake::ProblemStatement,
    stage::{PipelineStage, StageBaton, StageKind, StageOutput},
};

/// Opens the run: thinks about the statement and seeds the engine context
/// the later stages attach to.
pub struct ProblemAnalysis {
    engine: Arc<RwLock<ThinkingEngine>>,
}

impl ProblemAnalysis {
    /// Creates the stage over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<RwLock<ThinkingEngine>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PipelineStage for ProblemAnalysis {
    fn kind(&self) -> StageKind {
        StageKind::ProblemAnalysis
    }

    async fn run(&self, problem: &ProblemStatement, _baton: &StageBaton) -> Result<StageOutput> {
        let mut engine = self.engine.write().await;
        let depth = engine.config().reasoning_depth;
        let chain = engine.think_about(&problem.statement, None, depth)?;
        let members = engine.chain_members(&chain);
        let context = members.first().map(|thought| thought.context);
        let mut insights: Vec<String> = members
            .iter()
            .filter(|thought| thought.depth == 1)
            .map(|thought| thought.content.clone())
            .collect();
        if let Some(conclusion) = &chain.conclusion {
            insights.push(conclusion.clone());
        }
        Ok(StageOutput {
            stage: self.kind(),
            insights,
            confidence: chain.confidence,
            candidates: Vec::new(),
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitron_engine::EngineConfig;

    #[tokio::test]
    async fn analysis_seeds_context_and_insights() {
        let engine = Arc::new(RwLock::new(
            ThinkingEngine::with_seed(EngineConfig::default(), 2).unwrap(),
        ));
        let stage = ProblemAnalysis::new(Arc::clone(&engine));
        let problem = ProblemStatement::new("shrink docker image size").unwrap();
        let output = stage.run(&problem, &StageBaton::default()).await.unwrap();
        assert_eq!(output.stage, StageKind::ProblemAnalysis);
        assert!(output.context.is_some());
        assert!(output.confidence > 0.0);
        assert!(output
            .insights
            .iter()
            .any(|insight| insight.starts_with("Based on")));
    }
}
