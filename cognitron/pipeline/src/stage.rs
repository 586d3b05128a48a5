use anyhow::Result;
use async_trait::async_trait;
use cognitron_engine::StrategyKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intake::ProblemStatement;

/// Named stages in their default execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Break the problem apart and surface angles.
    ProblemAnalysis,
    /// Fold the caller's context and domain lenses in.
    ContextIntegration,
    /// Produce candidate solutions via the strategy library.
    SolutionGeneration,
    /// Score candidates for feasibility.
    FeasibilityAssessment,
    /// Re-rank, prune, and finalize.
    Optimization,
}

impl StageKind {
    /// Snake-case label matching the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ProblemAnalysis => "problem_analysis",
            Self::ContextIntegration => "context_integration",
            Self::SolutionGeneration => "solution_generation",
            Self::FeasibilityAssessment => "feasibility_assessment",
            Self::Optimization => "optimization",
        }
    }

    /// The default stage order.
    #[must_use]
    pub const fn default_order() -> [Self; 5] {
        [
            Self::ProblemAnalysis,
            Self::ContextIntegration,
            Self::SolutionGeneration,
            Self::FeasibilityAssessment,
            Self::Optimization,
        ]
    }
}

/// A candidate solution flowing through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate summary text.
    pub summary: String,
    /// Current score (0..=1), refined by later stages.
    pub score: f32,
    /// Strategy that produced the candidate, when known.
    pub strategy: Option<StrategyKind>,
}

/// Output of one stage run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    /// Stage that produced this output.
    pub stage: StageKind,
    /// Insights surfaced by the stage.
    pub insights: Vec<String>,
    /// Stage-level confidence (0..=1).
    pub confidence: f32,
    /// Candidate solutions after this stage.
    pub candidates: Vec<Candidate>,
    /// Engine context the stage worked in, when it touched the engine.
    pub context: Option<Uuid>,
}

/// State carried forward between stages.
#[derive(Debug, Clone, Default)]
pub struct StageBaton {
    /// Insights accumulated so far.
    pub insights: Vec<String>,
    /// Latest candidate set.
    pub candidates: Vec<Candidate>,
    /// Engine context established by an earlier stage.
    pub context: Option<Uuid>,
}

impl StageBaton {
    /// Folds a stage output into the baton.
    ///
    /// Insights accumulate; the candidate set is replaced by the newest
    /// non-empty one; the engine context sticks once established.
    pub fn absorb(&mut self, output: &StageOutput) {
        self.insights.extend(output.insights.iter().cloned());
        if !output.candidates.is_empty() {
            self.candidates = output.candidates.clone();
        }
        if output.context.is_some() {
            self.context = output.context;
        }
    }
}

/// One named processing stage.
#[async_trait]
pub trait PipelineStage: Send + Sync {
    /// Which stage this implements.
    fn kind(&self) -> StageKind;

    /// Runs the stage against the problem and the state so far.
    async fn run(&self, problem: &ProblemStatement, baton: &StageBaton) -> Result<StageOutput>;
}
