use std::{cmp::Ordering, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use cognitron_engine::{ThinkingEngine, ThoughtKind};
use tokio::sync::RwLock;

use crate::{
    intake::ProblemStatement,
    stage::{Candidate, PipelineStage, StageBaton, StageKind, StageOutput},
};

/// Closes the run: re-ranks candidates, prunes those below the acceptance
/// threshold, and records the final recommendation set.
pub struct Optimization {
    engine: Arc<RwLock<ThinkingEngine>>,
}

impl Optimization {
    /// Creates the stage over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<RwLock<ThinkingEngine>>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl PipelineStage for Optimization {
    fn kind(&self) -> StageKind {
        StageKind::Optimization
    }

    async fn run(&self, problem: &ProblemStatement, baton: &StageBaton) -> Result<StageOutput> {
        let mut engine = self.engine.write().await;
        let threshold = engine.config().confidence_threshold;
        let mut ranked = baton.candidates.clone();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        let pruned = ranked
            .iter()
            .filter(|candidate| candidate.score < threshold)
            .count();
        let mut kept: Vec<Candidate> = ranked
            .iter()
            .filter(|candidate| candidate.score >= threshold)
            .cloned()
            .collect();
        if kept.is_empty() {
            // Never return empty-handed; the report's accepted flag carries
            // the verdict.
            kept.extend(ranked.first().cloned());
        }
        kept.truncate(3);
        let mut insights: Vec<String> = kept
            .iter()
            .map(|candidate| format!("Recommended: {} ({:.2})", candidate.summary, candidate.score))
            .collect();
        if pruned > 0 {
            insights.push(format!("Pruned {pruned} low-scoring candidates"));
        }
        if let Some(context) = baton.context {
            engine.create_thought(
                ThoughtKind::Optimization,
                format!("Optimizing: {}", problem.statement),
                context,
                1,
                None,
            );
        }
        let confidence = kept.first().map_or(0.0, |candidate| candidate.score);
        Ok(StageOutput {
            stage: self.kind(),
            insights,
            confidence,
            candidates: kept,
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitron_engine::EngineConfig;

    fn candidate(summary: &str, score: f32) -> Candidate {
        Candidate {
            summary: summary.into(),
            score,
            strategy: None,
        }
    }

    async fn run_stage(candidates: Vec<Candidate>) -> StageOutput {
        let engine = Arc::new(RwLock::new(
            ThinkingEngine::with_seed(EngineConfig::default(), 2).unwrap(),
        ));
        let stage = Optimization::new(engine);
        let problem = ProblemStatement::new("tighten alerts").unwrap();
        let baton = StageBaton {
            candidates,
            ..StageBaton::default()
        };
        stage.run(&problem, &baton).await.unwrap()
    }

    #[tokio::test]
    async fn prunes_below_threshold_and_reports_it() {
        let output = run_stage(vec![candidate("strong", 0.8), candidate("weak", 0.2)]).await;
        assert_eq!(output.candidates.len(), 1);
        assert!(output
            .insights
            .iter()
            .any(|insight| insight == "Pruned 1 low-scoring candidates"));
        assert!((output.confidence - 0.8).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn keeps_best_candidate_when_all_fall_short() {
        let output = run_stage(vec![candidate("meh", 0.3), candidate("worse", 0.1)]).await;
        assert_eq!(output.candidates.len(), 1);
        assert_eq!(output.candidates[0].summary, "meh");
    }

    #[tokio::test]
    async fn empty_candidates_yield_zero_confidence() {
        let output = run_stage(Vec::new()).await;
        assert!(output.candidates.is_empty());
        assert!((output.confidence - 0.0).abs() < f32::EPSILON);
    }
}
