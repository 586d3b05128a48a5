use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{error::EngineError, strategy::pattern::StrategyKind};

/// Tunable parameters for the thinking engine and pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Default recursion depth for a reasoning pass.
    pub reasoning_depth: u32,
    /// Hard ceiling on any requested depth.
    pub max_depth: u32,
    /// Maximum perspectives expanded per recursion layer.
    pub parallel_thoughts: usize,
    /// How many recent thoughts connection discovery considers.
    pub context_window: usize,
    /// Acceptance bar for verdicts and reports.
    pub confidence_threshold: f32,
    /// Jaccard similarity needed to link two thoughts.
    pub connection_threshold: f32,
    /// Fraction of blocked thoughts that triggers a context switch.
    pub context_switch_threshold: f32,
    /// Seconds a work item may stay blocked before reassignment.
    pub blocker_timeout_secs: u64,
    /// Maximum work items handed out per delegation.
    pub delegation_threshold: usize,
    /// Review candidate solutions concurrently.
    pub parallel_processing: bool,
    /// Knowledge domains consulted during context integration.
    pub knowledge_domains: Vec<String>,
    /// Strategies loaded into the library.
    pub strategies: Vec<StrategyKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reasoning_depth: 3,
            max_depth: 10,
            parallel_thoughts: 20,
            context_window: 100,
            confidence_threshold: 0.5,
            connection_threshold: 0.6,
            context_switch_threshold: 0.3,
            blocker_timeout_secs: 60,
            delegation_threshold: 5,
            parallel_processing: true,
            knowledge_domains: Vec::new(),
            strategies: StrategyKind::all().to_vec(),
        }
    }
}

impl EngineConfig {
    /// Loads and validates a config from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|err| EngineError::Configuration(err.to_string()))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|err| EngineError::Configuration(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges; every threshold must sit within 0..=1.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_depth == 0 {
            return Err(EngineError::Configuration("max_depth must be positive".into()));
        }
        if self.reasoning_depth > self.max_depth {
            return Err(EngineError::Configuration(format!(
                "reasoning_depth {} exceeds max_depth {}",
                self.reasoning_depth, self.max_depth
            )));
        }
        if self.context_window == 0 {
            return Err(EngineError::Configuration(
                "context_window must be positive".into(),
            ));
        }
        if self.parallel_thoughts == 0 {
            return Err(EngineError::Configuration(
                "parallel_thoughts must be positive".into(),
            ));
        }
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("connection_threshold", self.connection_threshold),
            ("context_switch_threshold", self.context_switch_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Configuration(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }
        Ok(())
    }
}
