use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use cognitron_engine::{ThinkingEngine, ThoughtKind};
use tokio::sync::RwLock;

use crate::{
    intake::ProblemStatement,
    stage::{PipelineStage, StageBaton, StageKind, StageOutput},
};

/// Folds the caller's context mapping and domain lenses into the run,
/// materializing each as a connection thought in the engine.
pub struct ContextIntegration {
    engine: Arc<RwLock<ThinkingEngine>>,
}

impl ContextIntegration {
    /// Creates the stage over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<RwLock<ThinkingEngine>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PipelineStage for ContextIntegration {
    fn kind(&self) -> StageKind {
        StageKind::ContextIntegration
    }

    async fn run(&self, problem: &ProblemStatement, baton: &StageBaton) -> Result<StageOutput> {
        let mut insights = Vec::new();
        for (key, value) in &problem.context {
            insights.push(format!("Context {key}: {value}"));
        }
        let mut engine = self.engine.write().await;
        let mut domains = engine.config().knowledge_domains.clone();
        for domain in &problem.domains {
            if !domains.contains(domain) {
                domains.push(domain.clone());
            }
        }
        for domain in &domains {
            insights.push(format!("Domain lens: {domain}"));
        }
        if let Some(context) = baton.context {
            for insight in &insights {
                engine.create_thought(ThoughtKind::Connection, insight.clone(), context, 1, None);
            }
        }
        let confidence = (0.4 + 0.05 * insights.len() as f32).min(0.9);
        Ok(StageOutput {
            stage: self.kind(),
            insights,
            confidence,
            candidates: Vec::new(),
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitron_engine::EngineConfig;
    use serde_json::json;

    #[tokio::test]
    async fn integration_renders_context_and_domains() {
        let config = EngineConfig {
            knowledge_domains: vec!["infrastructure".into()],
            ..EngineConfig::default()
        };
        let engine = Arc::new(RwLock::new(ThinkingEngine::with_seed(config, 2).unwrap()));
        let stage = ContextIntegration::new(Arc::clone(&engine));
        let mut context = serde_json::Map::new();
        context.insert("budget".into(), json!("limited"));
        let problem = ProblemStatement::new("cut egress costs")
            .unwrap()
            .with_context(context)
            .with_domains(["networking"]);
        let output = stage.run(&problem, &StageBaton::default()).await.unwrap();
        assert!(output
            .insights
            .iter()
            .any(|insight| insight.contains("Context budget")));
        assert!(output
            .insights
            .iter()
            .any(|insight| insight == "Domain lens: infrastructure"));
        assert!(output
            .insights
            .iter()
            .any(|insight| insight == "Domain lens: networking"));
    }

    #[tokio::test]
    async fn integration_materializes_thoughts_in_context() {
        let engine = Arc::new(RwLock::new(
            ThinkingEngine::with_seed(EngineConfig::default(), 2).unwrap(),
        ));
        let context = engine.write().await.create_context("pipeline run", None);
        let stage = ContextIntegration::new(Arc::clone(&engine));
        let problem = ProblemStatement::new("cut egress costs")
            .unwrap()
            .with_domains(["networking"]);
        let baton = StageBaton {
            context: Some(context),
            ..StageBaton::default()
        };
        stage.run(&problem, &baton).await.unwrap();
        let guard = engine.read().await;
        assert_eq!(guard.context(context).unwrap().thoughts.len(), 1);
    }
}
