#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Cognitron staged reasoning pipeline: problem intake, ordered stage
//! execution, and report aggregation over the thinking engine.

/// Problem intake and validation.
pub mod intake;
/// Final report types and aggregation.
pub mod report;
/// Stage trait, baton, and output types.
pub mod stage;

/// Stage executor.
#[path = "../executor.rs"]
pub mod executor;

/// Deep reasoning facade.
#[path = "../main.rs"]
pub mod facade;

/// Built-in stage implementations.
#[path = "../stages/main.rs"]
pub mod stages;

pub use executor::PipelineExecutor;
pub use facade::Cognitron;
pub use intake::ProblemStatement;
pub use report::{ReasoningReport, TraceStep};
pub use stage::{Candidate, PipelineStage, StageBaton, StageKind, StageOutput};
