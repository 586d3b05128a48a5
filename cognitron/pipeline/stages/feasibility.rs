use std::{cmp::Ordering, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use cognitron_engine::{engine::jaccard_similarity, ThinkingEngine};
use futures::future::join_all;
use tokio::sync::RwLock;

use crate::{
    intake::ProblemStatement,
    stage::{Candidate, PipelineStage, StageBaton, StageKind, StageOutput},
};

/// Scores each candidate for feasibility against the problem statement.
///
/// Candidates are reviewed concurrently when parallel processing is enabled.
pub struct FeasibilityAssessment {
    engine: Arc<RwLock<ThinkingEngine>>,
}

impl FeasibilityAssessment {
    /// Creates the stage over a shared engine.
    #[must_use]
    pub fn new(engine: Arc<RwLock<ThinkingEngine>>) -> Self {
        Self { engine }
    }
}

async fn assess(problem: &ProblemStatement, candidate: &Candidate) -> Candidate {
    let overlap = jaccard_similarity(&candidate.summary, &problem.statement);
    let strategy_bonus = if candidate.strategy.is_some() { 0.1 } else { 0.0 };
    let score = 0.5f32
        .mul_add(overlap, 0.3 + strategy_bonus)
        .clamp(0.0, 0.95);
    Candidate {
        summary: candidate.summary.clone(),
        score,
        strategy: candidate.strategy,
    }
}

#[async_trait]
impl PipelineStage for FeasibilityAssessment {
    fn kind(&self) -> StageKind {
        StageKind::FeasibilityAssessment
    }

    async fn run(&self, problem: &ProblemStatement, baton: &StageBaton) -> Result<StageOutput> {
        let parallel = self.engine.read().await.config().parallel_processing;
        let evals = baton.candidates.iter().map(|candidate| assess(problem, candidate));
        let mut scored: Vec<Candidate> = if parallel {
            join_all(evals).await
        } else {
            let mut out = Vec::with_capacity(baton.candidates.len());
            for eval in evals {
                out.push(eval.await);
            }
            out
        };
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        let insights: Vec<String> = scored
            .iter()
            .take(3)
            .map(|candidate| format!("{} (feasibility {:.2})", candidate.summary, candidate.score))
            .collect();
        let confidence = scored.first().map_or(0.0, |candidate| candidate.score);
        Ok(StageOutput {
            stage: self.kind(),
            insights,
            confidence,
            candidates: scored,
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cognitron_engine::{EngineConfig, StrategyKind};

    fn candidate(summary: &str, strategy: Option<StrategyKind>) -> Candidate {
        Candidate {
            summary: summary.into(),
            score: 0.5,
            strategy,
        }
    }

    async fn run_with(parallel: bool) -> StageOutput {
        let config = EngineConfig {
            parallel_processing: parallel,
            ..EngineConfig::default()
        };
        let engine = Arc::new(RwLock::new(ThinkingEngine::with_seed(config, 2).unwrap()));
        let stage = FeasibilityAssessment::new(engine);
        let problem = ProblemStatement::new("reduce build times").unwrap();
        let baton = StageBaton {
            candidates: vec![
                candidate("Part 1 of reduce build times", Some(StrategyKind::DivideConquer)),
                candidate("unrelated musing", None),
            ],
            ..StageBaton::default()
        };
        stage.run(&problem, &baton).await.unwrap()
    }

    #[tokio::test]
    async fn scoring_prefers_overlapping_candidates() {
        let output = run_with(true).await;
        assert_eq!(output.candidates.len(), 2);
        assert!(output.candidates[0].summary.contains("Part 1"));
        assert!(output.candidates[0].score > output.candidates[1].score);
        assert!((output.confidence - output.candidates[0].score).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn sequential_review_scores_identically() {
        let parallel = run_with(true).await;
        let sequential = run_with(false).await;
        let scores = |output: &StageOutput| -> Vec<f32> {
            output.candidates.iter().map(|c| c.score).collect()
        };
        assert_eq!(scores(&parallel), scores(&sequential));
    }
}
