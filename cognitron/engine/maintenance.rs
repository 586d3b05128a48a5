use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{
    sync::{watch, RwLock},
    task::JoinHandle,
    time,
};

use crate::{engine::ThinkingEngine, telemetry::EngineTelemetry};

/// Counters accumulated by the maintenance loop.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MaintenanceStats {
    /// Loop iterations completed.
    pub ticks: u64,
    /// Links created by connection discovery.
    pub links_discovered: u64,
    /// Contexts newly blocked by blocker scans.
    pub contexts_blocked: u64,
    /// Context switches performed.
    pub switches: u64,
}

/// Handle controlling a spawned maintenance loop.
pub struct MaintenanceHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    stats: Arc<Mutex<MaintenanceStats>>,
}

impl MaintenanceHandle {
    /// Snapshot of the counters so far.
    #[must_use]
    pub fn stats(&self) -> MaintenanceStats {
        *self.stats.lock()
    }

    /// Signals shutdown and waits for the loop to exit.
    pub async fn stop(self) -> MaintenanceStats {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
        *self.stats.lock()
    }
}

/// Spawns the background maintenance loop.
///
/// Every tick runs the blocker scan, connection discovery, and context
/// maintenance against the shared engine, mirroring counters into the
/// returned handle.
#[must_use]
pub fn spawn_maintenance(
    engine: Arc<RwLock<ThinkingEngine>>,
    telemetry: Option<EngineTelemetry>,
    tick: Duration,
) -> MaintenanceHandle {
    let (shutdown, mut signal) = watch::channel(false);
    let stats = Arc::new(Mutex::new(MaintenanceStats::default()));
    let loop_stats = Arc::clone(&stats);
    if let Some(tel) = &telemetry {
        let _ = tel.event("engine.maintenance.started", json!({}));
    }
    let task = tokio::spawn(async move {
        let mut ticker = time::interval(tick);
        loop {
            tokio::select! {
                _ = signal.changed() => break,
                _ = ticker.tick() => {
                    let (blocked, links, switch) = {
                        let mut engine = engine.write().await;
                        let blocked = engine.scan_for_blockers();
                        let links = engine.discover_connections();
                        let switch = engine.maintain_contexts();
                        (blocked, links, switch)
                    };
                    {
                        let mut stats = loop_stats.lock();
                        stats.ticks += 1;
                        stats.links_discovered += links as u64;
                        stats.contexts_blocked += blocked.len() as u64;
                        if switch.is_some() {
                            stats.switches += 1;
                        }
                    }
                    if let Some(tel) = &telemetry {
                        for context in &blocked {
                            let _ = tel.event(
                                "engine.context.blocked",
                                json!({ "context": context }),
                            );
                        }
                        if let Some(switch) = &switch {
                            let _ = tel.event(
                                "engine.context.switched",
                                json!({ "from": switch.from, "to": switch.to }),
                            );
                        }
                    }
                }
            }
        }
        if let Some(tel) = &telemetry {
            let _ = tel.event("engine.maintenance.stopped", json!({}));
        }
    });
    MaintenanceHandle {
        shutdown,
        task,
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::EngineConfig, thought::ThoughtKind};

    #[tokio::test]
    async fn maintenance_blocks_contexts_and_stops() {
        let engine = Arc::new(RwLock::new(
            ThinkingEngine::with_seed(EngineConfig::default(), 3).unwrap(),
        ));
        {
            let mut guard = engine.write().await;
            let context = guard.create_context("ops", None);
            guard.create_thought(
                ThoughtKind::BlockerDetection,
                "stuck waiting on approvals",
                context,
                0,
                None,
            );
        }
        let handle = spawn_maintenance(Arc::clone(&engine), None, Duration::from_millis(10));
        time::sleep(Duration::from_millis(60)).await;
        let stats = handle.stop().await;
        assert!(stats.ticks >= 1);
        assert_eq!(stats.contexts_blocked, 1);
        let guard = engine.read().await;
        let status = guard.status();
        assert_eq!(status.alternative_paths, 1);
    }
}
