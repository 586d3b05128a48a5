use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use cogni_logging::LogLevel;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{sync::RwLock, task::JoinHandle, time};
use uuid::Uuid;

use crate::{
    chain::ReasoningChain,
    config::EngineConfig,
    delegation::{assign_round_robin, work_items_from_chain, WorkStatus},
    engine::{EngineStatus, ThinkingEngine},
    maintenance::{spawn_maintenance, MaintenanceHandle},
    telemetry::EngineTelemetry,
};

/// Outcome of leading a task: the decomposition and its delegation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadershipReport {
    /// Task that was led.
    pub task: String,
    /// Leadership context created for the task.
    pub context: Uuid,
    /// Decomposition chain.
    pub chain: Uuid,
    /// Conclusion of the decomposition chain.
    pub decomposition: Option<String>,
    /// Work items extracted and tracked.
    pub work_items: Vec<Uuid>,
    /// Item id → assigned resource.
    pub delegation: IndexMap<Uuid, String>,
}

/// Async facade over the thinking engine.
///
/// Wraps the synchronous [`ThinkingEngine`] for concurrent callers, spawns
/// monitors for delegated work, and emits telemetry along the way.
pub struct ReasonerRuntime {
    engine: Arc<RwLock<ThinkingEngine>>,
    telemetry: Option<EngineTelemetry>,
    monitors: Arc<Mutex<HashMap<Uuid, JoinHandle<()>>>>,
    monitor_tick: Duration,
}

impl ReasonerRuntime {
    /// Creates a runtime after validating the config.
    pub fn new(config: EngineConfig, telemetry: Option<EngineTelemetry>) -> Result<Self> {
        let engine = ThinkingEngine::new(config)?;
        Ok(Self {
            engine: Arc::new(RwLock::new(engine)),
            telemetry,
            monitors: Arc::new(Mutex::new(HashMap::new())),
            monitor_tick: Duration::from_millis(200),
        })
    }

    /// Creates a runtime with a fixed RNG seed for reproducible descent.
    pub fn with_seed(
        config: EngineConfig,
        seed: u64,
        telemetry: Option<EngineTelemetry>,
    ) -> Result<Self> {
        let engine = ThinkingEngine::with_seed(config, seed)?;
        Ok(Self {
            engine: Arc::new(RwLock::new(engine)),
            telemetry,
            monitors: Arc::new(Mutex::new(HashMap::new())),
            monitor_tick: Duration::from_millis(200),
        })
    }

    /// Overrides the cadence of spawned work monitors.
    #[must_use]
    pub fn with_monitor_tick(mut self, tick: Duration) -> Self {
        self.monitor_tick = tick;
        self
    }

    /// Shared handle to the underlying engine.
    #[must_use]
    pub fn engine(&self) -> Arc<RwLock<ThinkingEngine>> {
        Arc::clone(&self.engine)
    }

    /// Thinks about a topic at the requested (or configured) depth.
    pub async fn think_about(
        &self,
        topic: &str,
        depth: Option<u32>,
    ) -> Result<ReasoningChain> {
        let mut engine = self.engine.write().await;
        let depth = depth.unwrap_or(engine.config().reasoning_depth);
        let chain = engine.think_about(topic, None, depth)?;
        drop(engine);
        self.record(
            "engine.chain.completed",
            &json!({
                "chain": chain.id,
                "thoughts": chain.thoughts.len(),
                "confidence": chain.confidence,
            }),
        );
        Ok(chain)
    }

    /// Leads a task: decomposes it, delegates the pieces, and monitors them.
    pub async fn lead_and_delegate(
        &self,
        task: &str,
        resources: &[String],
    ) -> Result<LeadershipReport> {
        let (report, blocker_timeout) = {
            let mut engine = self.engine.write().await;
            let context = engine.create_context(&format!("Leadership: {task}"), None);
            let chain = engine.think_about(&format!("How to break down: {task}"), Some(context), 3)?;
            let members = engine.chain_members(&chain);
            let mut items = work_items_from_chain(&chain, &members, context);
            items.sort_by(|a, b| b.priority.cmp(&a.priority));
            items.truncate(engine.config().delegation_threshold.max(1));
            let delegation = assign_round_robin(&mut items, resources);
            let work_items: Vec<Uuid> = items.iter().map(|item| item.id).collect();
            for item in items {
                engine.insert_work(item);
            }
            let report = LeadershipReport {
                task: task.to_string(),
                context,
                chain: chain.id,
                decomposition: chain.conclusion.clone(),
                work_items,
                delegation,
            };
            (report, Duration::from_secs(engine.config().blocker_timeout_secs))
        };
        for (item, owner) in &report.delegation {
            self.record(
                "engine.delegation.assigned",
                &json!({ "item": item, "owner": owner }),
            );
        }
        let monitor = tokio::spawn(monitor_work(
            Arc::clone(&self.engine),
            self.telemetry.clone(),
            report.context,
            self.monitor_tick,
            blocker_timeout,
        ));
        self.monitors.lock().insert(report.context, monitor);
        Ok(report)
    }

    /// Waits for the monitor of a led context to finish.
    pub async fn wait_for_leadership(&self, context: Uuid) -> Result<()> {
        let handle = self.monitors.lock().remove(&context);
        if let Some(handle) = handle {
            handle.await?;
        }
        Ok(())
    }

    /// Completes a work item with an optional result payload.
    pub async fn complete_work(
        &self,
        id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<()> {
        self.engine.write().await.complete_work(id, result)?;
        Ok(())
    }

    /// Marks a work item blocked.
    pub async fn block_work(&self, id: Uuid) -> Result<()> {
        self.engine.write().await.set_work_status(id, WorkStatus::Blocked)?;
        self.record("engine.work.blocked", &json!({ "item": id }));
        Ok(())
    }

    /// Aggregate engine counters.
    pub async fn status(&self) -> EngineStatus {
        self.engine.read().await.status()
    }

    /// Text rendering of recent thoughts.
    pub async fn thought_graph(&self, limit: usize) -> String {
        self.engine.read().await.thought_graph(limit)
    }

    /// Spawns the background maintenance loop at the given cadence.
    #[must_use]
    pub fn spawn_maintenance(&self, tick: Duration) -> MaintenanceHandle {
        spawn_maintenance(Arc::clone(&self.engine), self.telemetry.clone(), tick)
    }

    fn record(&self, kind: &str, payload: &serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(LogLevel::Info, kind, payload);
            let _ = tel.event(kind, payload.clone());
        }
    }
}

/// Watches delegated work for a context until everything completes.
///
/// Blocked items get an unblock chain; persistent blockers are returned to
/// the pending pool once the blocker timeout elapses.
async fn monitor_work(
    engine: Arc<RwLock<ThinkingEngine>>,
    telemetry: Option<EngineTelemetry>,
    context: Uuid,
    tick: Duration,
    blocker_timeout: Duration,
) {
    let emit = |kind: &str, payload: serde_json::Value| {
        if let Some(tel) = &telemetry {
            let _ = tel.event(kind, payload);
        }
    };
    let mut blocked_since: HashMap<Uuid, Instant> = HashMap::new();
    loop {
        time::sleep(tick).await;
        let items = engine.read().await.work_for_context(context);
        if items.is_empty() {
            break;
        }
        if items
            .iter()
            .all(|item| item.status == WorkStatus::Completed)
        {
            let mut guard = engine.write().await;
            let _ = guard.complete_context(context);
            drop(guard);
            emit("engine.context.completed", json!({ "context": context }));
            break;
        }
        for item in items
            .iter()
            .filter(|item| item.status == WorkStatus::Blocked)
        {
            let since = blocked_since.entry(item.id).or_insert_with(Instant::now);
            if since.elapsed() >= blocker_timeout {
                let mut guard = engine.write().await;
                let _ = guard.reset_work(item.id);
                drop(guard);
                blocked_since.remove(&item.id);
                emit("engine.work.reassigned", json!({ "item": item.id }));
                continue;
            }
            let unblock = {
                let mut guard = engine.write().await;
                guard.think_about(
                    &format!("How to unblock: {}", item.description),
                    Some(context),
                    2,
                )
            };
            if let Ok(chain) = unblock {
                if chain.confidence > 0.7 {
                    let mut guard = engine.write().await;
                    let _ = guard.set_work_status(item.id, WorkStatus::InProgress);
                    drop(guard);
                    blocked_since.remove(&item.id);
                    emit(
                        "engine.work.unblocked",
                        json!({ "item": item.id, "confidence": chain.confidence }),
                    );
                }
            }
        }
    }
}
