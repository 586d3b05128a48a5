#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Cognitron continuous thinking engine: nested reasoning chains, blocker
//! recovery, connection discovery, and delegated work monitoring.

/// Reasoning chains and their synthesis.
pub mod chain;
/// Engine configuration and validation.
pub mod config;
/// Contexts the engine works within.
pub mod context;
/// Work items and delegation helpers.
pub mod delegation;
/// Error definitions.
pub mod error;
/// Thought primitives.
pub mod thought;

/// Core thinking engine state and algorithms.
#[path = "../engine.rs"]
pub mod engine;

/// Background maintenance loop.
#[path = "../maintenance.rs"]
pub mod maintenance;

/// Async runtime facade.
#[path = "../main.rs"]
pub mod runtime;

/// Problem-decomposition strategy library.
#[path = "../strategy/main.rs"]
pub mod strategy;

/// Telemetry builder/handle for engine components.
#[path = "../telemetry.rs"]
pub mod telemetry;

pub use chain::ReasoningChain;
pub use config::EngineConfig;
pub use context::{Context, ContextStatus};
pub use delegation::{WorkItem, WorkStatus};
pub use engine::{ContextSwitch, EngineStatus, ThinkingEngine};
pub use error::EngineError;
pub use maintenance::{MaintenanceHandle, MaintenanceStats};
pub use runtime::{LeadershipReport, ReasonerRuntime};
pub use strategy::{pattern::StrategyKind, StrategyLibrary};
pub use telemetry::{EngineTelemetry, EngineTelemetryBuilder};
pub use thought::{Thought, ThoughtKind};
