use std::sync::Arc;

use cognitron_engine::ThinkingEngine;
use tokio::sync::RwLock;

use crate::stage::PipelineStage;

/// Problem-analysis stage.
pub mod analysis;
/// Feasibility scoring stage.
pub mod feasibility;
/// Context-integration stage.
pub mod integrate;
/// Final optimization stage.
pub mod optimize;
/// Solution-generation stage.
pub mod solution;

/// Builds the default stage roster in canonical order.
#[must_use]
pub fn default_stages(engine: &Arc<RwLock<ThinkingEngine>>) -> Vec<Arc<dyn PipelineStage>> {
    vec![
        Arc::new(analysis::ProblemAnalysis::new(Arc::clone(engine))),
        Arc::new(integrate::ContextIntegration::new(Arc::clone(engine))),
        Arc::new(solution::SolutionGeneration::new(Arc::clone(engine))),
        Arc::new(feasibility::FeasibilityAssessment::new(Arc::clone(engine))),
        Arc::new(optimize::Optimization::new(Arc::clone(engine))),
    ]
}
