use anyhow::Result;
use cogni_logging::LogLevel;
use cognitron_engine::{EngineConfig, EngineStatus, EngineTelemetry, ReasonerRuntime};
use serde_json::json;

use crate::{executor::PipelineExecutor, intake::ProblemStatement, report::ReasoningReport};

/// The deep reasoning facade: one entry point over the engine runtime and
/// the staged pipeline.
pub struct Cognitron {
    runtime: ReasonerRuntime,
    executor: PipelineExecutor,
    confidence_threshold: f32,
    telemetry: Option<EngineTelemetry>,
}

impl Cognitron {
    /// Creates a facade from a validated config.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_telemetry(config, None)
    }

    /// Creates a facade with telemetry sinks attached.
    pub fn with_telemetry(
        config: EngineConfig,
        telemetry: Option<EngineTelemetry>,
    ) -> Result<Self> {
        let confidence_threshold = config.confidence_threshold;
        let runtime = ReasonerRuntime::new(config, telemetry.clone())?;
        let executor = PipelineExecutor::with_defaults(&runtime.engine(), telemetry.clone());
        Ok(Self {
            runtime,
            executor,
            confidence_threshold,
            telemetry,
        })
    }

    /// The underlying engine runtime.
    #[must_use]
    pub const fn runtime(&self) -> &ReasonerRuntime {
        &self.runtime
    }

    /// Processes a validated problem through every stage and aggregates the
    /// report.
    pub async fn process(&self, problem: &ProblemStatement) -> Result<ReasoningReport> {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "pipeline.intake.received",
                &json!({ "problem": problem.id, "domains": problem.domains }),
            );
        }
        let outputs = self.executor.run(problem).await?;
        let report =
            crate::report::aggregate_report(problem.id, &outputs, self.confidence_threshold);
        if let Some(tel) = &self.telemetry {
            let _ = tel.event(
                "pipeline.report.generated",
                json!({
                    "problem": problem.id,
                    "confidence": report.confidence,
                    "accepted": report.accepted,
                }),
            );
        }
        Ok(report)
    }

    /// Validates a bare statement and processes it.
    pub async fn process_text(&self, statement: &str) -> Result<ReasoningReport> {
        let problem = ProblemStatement::new(statement)?;
        self.process(&problem).await
    }

    /// Aggregate engine counters.
    pub async fn status(&self) -> EngineStatus {
        self.runtime.status().await
    }
}
