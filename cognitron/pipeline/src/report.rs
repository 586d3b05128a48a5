use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stage::{StageKind, StageOutput};

/// One step in the report's reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    /// Stage the step came from.
    pub stage: StageKind,
    /// Leading insight of the stage.
    pub summary: String,
    /// Stage confidence.
    pub confidence: f32,
    /// When the step was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Final aggregated reasoning result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningReport {
    /// Problem the report answers.
    pub problem: Uuid,
    /// Final insight set.
    pub insights: Vec<String>,
    /// Aggregate confidence (0..=1).
    pub confidence: f32,
    /// Ordered trace of the stages that ran.
    pub reasoning_chain: Vec<TraceStep>,
    /// Whether confidence cleared the acceptance threshold.
    pub accepted: bool,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
}

/// Relative weight of each stage in the aggregate confidence.
const fn stage_weight(stage: StageKind) -> f32 {
    match stage {
        StageKind::ProblemAnalysis => 0.15,
        StageKind::ContextIntegration => 0.1,
        StageKind::SolutionGeneration => 0.2,
        StageKind::FeasibilityAssessment => 0.25,
        StageKind::Optimization => 0.3,
    }
}

/// Collects stage outputs into the final report.
///
/// Confidence is the stage-weighted mean; insights come from the last stage
/// that produced any, falling back to the union.
#[must_use]
pub fn aggregate_report(
    problem: Uuid,
    outputs: &[StageOutput],
    confidence_threshold: f32,
) -> ReasoningReport {
    let mut weighted = 0.0f32;
    let mut weight_sum = 0.0f32;
    let mut reasoning_chain = Vec::with_capacity(outputs.len());
    for output in outputs {
        let weight = stage_weight(output.stage);
        weighted += output.confidence * weight;
        weight_sum += weight;
        reasoning_chain.push(TraceStep {
            stage: output.stage,
            summary: output
                .insights
                .first()
                .cloned()
                .unwrap_or_else(|| "no findings".to_string()),
            confidence: output.confidence,
            recorded_at: Utc::now(),
        });
    }
    let confidence = if weight_sum > 0.0 {
        (weighted / weight_sum).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let insights = outputs
        .iter()
        .rev()
        .find(|output| !output.insights.is_empty())
        .map(|output| output.insights.clone())
        .unwrap_or_else(|| {
            outputs
                .iter()
                .flat_map(|output| output.insights.iter().cloned())
                .collect()
        });
    ReasoningReport {
        problem,
        insights,
        confidence,
        reasoning_chain,
        accepted: confidence >= confidence_threshold,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stage: StageKind, confidence: f32, insights: Vec<String>) -> StageOutput {
        StageOutput {
            stage,
            insights,
            confidence,
            candidates: Vec::new(),
            context: None,
        }
    }

    #[test]
    fn empty_outputs_yield_zero_confidence() {
        let report = aggregate_report(Uuid::new_v4(), &[], 0.5);
        assert!((report.confidence - 0.0).abs() < f32::EPSILON);
        assert!(!report.accepted);
        assert!(report.reasoning_chain.is_empty());
    }

    #[test]
    fn later_stages_weigh_more() {
        let low_late = aggregate_report(
            Uuid::new_v4(),
            &[
                output(StageKind::ProblemAnalysis, 0.9, vec![]),
                output(StageKind::Optimization, 0.1, vec![]),
            ],
            0.5,
        );
        let high_late = aggregate_report(
            Uuid::new_v4(),
            &[
                output(StageKind::ProblemAnalysis, 0.1, vec![]),
                output(StageKind::Optimization, 0.9, vec![]),
            ],
            0.5,
        );
        assert!(high_late.confidence > low_late.confidence);
    }

    #[test]
    fn insights_prefer_the_last_nonempty_stage() {
        let report = aggregate_report(
            Uuid::new_v4(),
            &[
                output(StageKind::ProblemAnalysis, 0.6, vec!["early".into()]),
                output(StageKind::Optimization, 0.7, vec!["final".into()]),
            ],
            0.5,
        );
        assert_eq!(report.insights, vec!["final".to_string()]);
        assert!(report.accepted);
    }

    #[test]
    fn trace_summary_falls_back_when_stage_was_silent() {
        let report = aggregate_report(
            Uuid::new_v4(),
            &[output(StageKind::ContextIntegration, 0.4, vec![])],
            0.5,
        );
        assert_eq!(report.reasoning_chain[0].summary, "no findings");
        assert!(!report.accepted);
    }
}
