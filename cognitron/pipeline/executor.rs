use std::sync::Arc;

use anyhow::Result;
use cogni_logging::LogLevel;
use cognitron_engine::{EngineTelemetry, ThinkingEngine};
use serde_json::json;
use tokio::sync::RwLock;

use crate::{
    intake::ProblemStatement,
    stage::{PipelineStage, StageBaton, StageOutput},
    stages::default_stages,
};

/// Runs an ordered roster of stages, threading the baton between them.
pub struct PipelineExecutor {
    stages: Vec<Arc<dyn PipelineStage>>,
    telemetry: Option<EngineTelemetry>,
}

impl PipelineExecutor {
    /// Creates an executor over an explicit stage roster.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn PipelineStage>>, telemetry: Option<EngineTelemetry>) -> Self {
        Self { stages, telemetry }
    }

    /// Creates an executor with the default stage roster.
    #[must_use]
    pub fn with_defaults(
        engine: &Arc<RwLock<ThinkingEngine>>,
        telemetry: Option<EngineTelemetry>,
    ) -> Self {
        Self::new(default_stages(engine), telemetry)
    }

    /// Labels of the stages in execution order.
    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.kind().label()).collect()
    }

    /// Runs every stage in order and returns their outputs.
    pub async fn run(&self, problem: &ProblemStatement) -> Result<Vec<StageOutput>> {
        let mut baton = StageBaton::default();
        let mut outputs = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let output = stage.run(problem, &baton).await?;
            if let Some(tel) = &self.telemetry {
                let payload = json!({
                    "problem": problem.id,
                    "stage": output.stage.label(),
                    "confidence": output.confidence,
                    "candidates": output.candidates.len(),
                });
                let _ = tel.log(LogLevel::Info, "pipeline.stage.completed", &payload);
                let _ = tel.event("pipeline.stage.completed", payload);
            }
            baton.absorb(&output);
            outputs.push(output);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind;
    use cognitron_engine::EngineConfig;

    fn executor() -> PipelineExecutor {
        let engine = Arc::new(RwLock::new(
            ThinkingEngine::with_seed(EngineConfig::default(), 2).unwrap(),
        ));
        PipelineExecutor::with_defaults(&engine, None)
    }

    #[tokio::test]
    async fn executor_runs_stages_in_order() {
        let problem = ProblemStatement::new("derisk the launch").unwrap();
        let outputs = executor().run(&problem).await.unwrap();
        let kinds: Vec<StageKind> = outputs.iter().map(|output| output.stage).collect();
        assert_eq!(kinds, StageKind::default_order().to_vec());
        // Solution generation fed feasibility: final candidates carry scores.
        let last = outputs.last().unwrap();
        assert!(!last.candidates.is_empty());
    }

    #[test]
    fn labels_expose_the_roster() {
        assert_eq!(
            executor().labels(),
            vec![
                "problem_analysis",
                "context_integration",
                "solution_generation",
                "feasibility_assessment",
                "optimization",
            ]
        );
    }
}
