use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    chain::{chain_confidence, synthesize_conclusion, ReasoningChain},
    config::EngineConfig,
    context::{Context, ContextStatus},
    delegation::{WorkItem, WorkStatus},
    error::EngineError,
    thought::{content_signals_blocker, perspective_content, Thought, ThoughtKind},
};

/// Upper bound on the recent-thought deque.
const RECENT_CAPACITY: usize = 10_000;

/// Perspectives tried when expanding a thought, in order.
const PERSPECTIVES: [ThoughtKind; 5] = [
    ThoughtKind::Analysis,
    ThoughtKind::ProblemSolving,
    ThoughtKind::Connection,
    ThoughtKind::ReverseEngineering,
    ThoughtKind::RiskAssessment,
];

/// Record of one context switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSwitch {
    /// Context switched away from.
    pub from: Uuid,
    /// Context switched to.
    pub to: Uuid,
    /// When the switch happened.
    pub at: DateTime<Utc>,
}

/// Aggregate counters describing engine state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Thoughts held overall.
    pub total_thoughts: usize,
    /// Thoughts in the recent window.
    pub recent_thoughts: usize,
    /// Contexts created.
    pub contexts: usize,
    /// Reasoning chains closed.
    pub reasoning_chains: usize,
    /// Work items tracked.
    pub work_items: usize,
    /// Blocked thoughts with registered workarounds.
    pub alternative_paths: usize,
    /// Directed thought links discovered.
    pub thought_links: usize,
    /// Context switches performed.
    pub context_switches: usize,
    /// Context on top of the stack, if any.
    pub current_context: Option<Uuid>,
}

/// Continuous thinking engine: thought storage, nested reasoning, blocker
/// recovery, connection discovery, and context switching.
///
/// The engine itself is synchronous; [`crate::runtime::ReasonerRuntime`]
/// wraps it for async callers and background maintenance.
pub struct ThinkingEngine {
    config: EngineConfig,
    thoughts: HashMap<Uuid, Thought>,
    contexts: HashMap<Uuid, Context>,
    chains: HashMap<Uuid, ReasoningChain>,
    work_items: HashMap<Uuid, WorkItem>,
    recent: VecDeque<Uuid>,
    links: HashMap<Uuid, IndexSet<Uuid>>,
    alternatives: HashMap<Uuid, Vec<Uuid>>,
    context_stack: Vec<Uuid>,
    switches: Vec<ContextSwitch>,
    rng: SmallRng,
}

impl ThinkingEngine {
    /// Creates an engine after validating the config.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            thoughts: HashMap::new(),
            contexts: HashMap::new(),
            chains: HashMap::new(),
            work_items: HashMap::new(),
            recent: VecDeque::new(),
            links: HashMap::new(),
            alternatives: HashMap::new(),
            context_stack: Vec::new(),
            switches: Vec::new(),
            rng: SmallRng::from_entropy(),
        })
    }

    /// Creates an engine with a fixed RNG seed for reproducible descent.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, EngineError> {
        let mut engine = Self::new(config)?;
        engine.rng = SmallRng::seed_from_u64(seed);
        Ok(engine)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up a thought.
    #[must_use]
    pub fn thought(&self, id: Uuid) -> Option<&Thought> {
        self.thoughts.get(&id)
    }

    /// Looks up a context.
    #[must_use]
    pub fn context(&self, id: Uuid) -> Option<&Context> {
        self.contexts.get(&id)
    }

    /// Looks up a closed chain.
    #[must_use]
    pub fn chain(&self, id: Uuid) -> Option<&ReasoningChain> {
        self.chains.get(&id)
    }

    /// Looks up a work item.
    #[must_use]
    pub fn work_item(&self, id: Uuid) -> Option<&WorkItem> {
        self.work_items.get(&id)
    }

    /// Registered workarounds for a blocked thought.
    #[must_use]
    pub fn alternatives_for(&self, blocked: Uuid) -> Option<&Vec<Uuid>> {
        self.alternatives.get(&blocked)
    }

    /// Creates a context, wiring it under `parent` when given.
    pub fn create_context(&mut self, name: &str, parent: Option<Uuid>) -> Uuid {
        let context = Context::new(name, parent);
        let id = context.id;
        self.contexts.insert(id, context);
        if let Some(parent_id) = parent {
            if let Some(parent_context) = self.contexts.get_mut(&parent_id) {
                parent_context.children.push(id);
            }
        }
        id
    }

    /// Creates a thought and registers it with its context and the recent window.
    pub fn create_thought(
        &mut self,
        kind: ThoughtKind,
        content: impl Into<String>,
        context: Uuid,
        depth: u32,
        parent: Option<Uuid>,
    ) -> Uuid {
        let thought = Thought::new(kind, content, context, depth, parent);
        let id = thought.id;
        self.thoughts.insert(id, thought);
        self.recent.push_back(id);
        if self.recent.len() > RECENT_CAPACITY {
            self.recent.pop_front();
        }
        if let Some(ctx) = self.contexts.get_mut(&context) {
            ctx.add_thought(id);
        }
        id
    }

    /// Thinks deeply about a topic, producing a closed reasoning chain.
    ///
    /// Expands the root through the first three perspectives per layer,
    /// spawning workarounds for blocking children and descending
    /// stochastically until `depth` is exhausted.
    pub fn think_about(
        &mut self,
        topic: &str,
        context: Option<Uuid>,
        depth: u32,
    ) -> Result<ReasoningChain, EngineError> {
        if topic.trim().is_empty() {
            return Err(EngineError::Validation("topic must not be empty".into()));
        }
        let depth = depth.min(self.config.max_depth);
        let context_id = match context {
            Some(id) => {
                if !self.contexts.contains_key(&id) {
                    return Err(EngineError::UnknownContext(id));
                }
                id
            }
            None => self.create_context(&format!("Thinking about {topic}"), None),
        };
        let root = self.create_thought(
            ThoughtKind::Analysis,
            format!("Analyzing: {topic}"),
            context_id,
            0,
            None,
        );
        let mut chain = ReasoningChain::new(root);
        self.expand_thought(root, &mut chain, context_id, depth);
        let members = self.chain_members(&chain);
        chain.confidence = chain_confidence(&members, chain.depth);
        chain.conclusion = Some(synthesize_conclusion(&members, chain.depth, chain.confidence));
        self.chains.insert(chain.id, chain.clone());
        Ok(chain)
    }

    fn expand_thought(
        &mut self,
        parent: Uuid,
        chain: &mut ReasoningChain,
        context: Uuid,
        remaining: u32,
    ) {
        if remaining == 0 {
            return;
        }
        let (parent_content, parent_depth) = match self.thoughts.get(&parent) {
            Some(thought) => (thought.content.clone(), thought.depth),
            None => return,
        };
        let fanout = self.config.parallel_thoughts.min(3);
        for perspective in PERSPECTIVES.into_iter().take(fanout) {
            let content = perspective_content(&parent_content, perspective);
            let child = self.create_thought(
                perspective,
                content.clone(),
                context,
                parent_depth + 1,
                Some(parent),
            );
            if let Some(parent_thought) = self.thoughts.get_mut(&parent) {
                parent_thought.children.push(child);
            }
            chain.push(child);
            if content_signals_blocker(&content) {
                if let Some(alternative) = self.spawn_alternatives(child, context) {
                    chain.push(alternative);
                }
            }
            if self.rng.gen::<f32>() > 0.5 {
                self.expand_thought(child, chain, context, remaining - 1);
            }
        }
    }

    /// Registers workarounds for a blocked thought and returns the first.
    ///
    /// The blocked thought is re-typed to blocker detection and flagged as
    /// requiring action.
    pub fn find_alternative_path(
        &mut self,
        blocked: Uuid,
        context: Uuid,
    ) -> Result<Uuid, EngineError> {
        if !self.thoughts.contains_key(&blocked) {
            return Err(EngineError::UnknownThought(blocked));
        }
        self.spawn_alternatives(blocked, context)
            .ok_or(EngineError::UnknownThought(blocked))
    }

    fn spawn_alternatives(&mut self, blocked: Uuid, context: Uuid) -> Option<Uuid> {
        let (content, depth) = {
            let thought = self.thoughts.get_mut(&blocked)?;
            thought.kind = ThoughtKind::BlockerDetection;
            thought.priority = ThoughtKind::BlockerDetection.default_priority();
            thought.action_required = true;
            (thought.content.clone(), thought.depth)
        };
        let candidates = [
            format!("Lateral approach: bypass {content}"),
            format!("Break down {content} into smaller parts"),
            format!("Use different approach for {content}"),
        ];
        let mut ids = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            ids.push(self.create_thought(
                ThoughtKind::AlternativePath,
                candidate,
                context,
                depth,
                None,
            ));
        }
        let first = ids.first().copied();
        self.alternatives.insert(blocked, ids);
        first
    }

    /// Links similar thoughts across the recent window.
    ///
    /// Returns the number of new links created.
    pub fn discover_connections(&mut self) -> usize {
        let window: Vec<(Uuid, String)> = self
            .recent
            .iter()
            .rev()
            .take(self.config.context_window)
            .filter_map(|id| {
                self.thoughts
                    .get(id)
                    .map(|thought| (*id, thought.content.clone()))
            })
            .collect();
        let mut created = 0;
        for (i, (id_a, content_a)) in window.iter().enumerate() {
            for (id_b, content_b) in window.iter().skip(i + 1) {
                if self
                    .links
                    .get(id_a)
                    .is_some_and(|linked| linked.contains(id_b))
                {
                    continue;
                }
                if jaccard_similarity(content_a, content_b) >= self.config.connection_threshold {
                    self.link_pair(*id_a, *id_b);
                    created += 1;
                }
            }
        }
        created
    }

    fn link_pair(&mut self, a: Uuid, b: Uuid) {
        if let Some(thought) = self.thoughts.get_mut(&a) {
            thought.links.push(b);
        }
        if let Some(thought) = self.thoughts.get_mut(&b) {
            thought.links.push(a);
        }
        self.links.entry(a).or_default().insert(b);
        self.links.entry(b).or_default().insert(a);
    }

    /// Marks contexts holding unresolved blockers as blocked and registers
    /// workarounds for any blocker without one.
    ///
    /// Returns the contexts newly blocked by this scan.
    pub fn scan_for_blockers(&mut self) -> Vec<Uuid> {
        let active: Vec<Uuid> = self
            .contexts
            .iter()
            .filter(|(_, context)| context.status == ContextStatus::Active)
            .map(|(id, _)| *id)
            .collect();
        let mut newly_blocked = Vec::new();
        for context_id in active {
            let blockers: Vec<Uuid> = self
                .contexts
                .get(&context_id)
                .map(|context| {
                    context
                        .thoughts
                        .iter()
                        .filter(|id| self.thoughts.get(*id).is_some_and(Thought::is_blocker))
                        .copied()
                        .collect()
                })
                .unwrap_or_default();
            if blockers.is_empty() {
                continue;
            }
            if let Some(context) = self.contexts.get_mut(&context_id) {
                context.status = ContextStatus::Blocked;
            }
            newly_blocked.push(context_id);
            for blocked in blockers {
                if !self.alternatives.contains_key(&blocked) {
                    self.spawn_alternatives(blocked, context_id);
                }
            }
        }
        newly_blocked
    }

    /// Pushes a context onto the focus stack.
    pub fn focus_context(&mut self, id: Uuid) -> Result<(), EngineError> {
        if !self.contexts.contains_key(&id) {
            return Err(EngineError::UnknownContext(id));
        }
        self.context_stack.push(id);
        Ok(())
    }

    /// Context currently focused, if any.
    #[must_use]
    pub fn current_context(&self) -> Option<Uuid> {
        self.context_stack.last().copied()
    }

    /// Switches away from the focused context when it is blocked badly enough.
    ///
    /// A switch fires once the fraction of unresolved blockers among the
    /// context's primary (non-workaround) thoughts reaches the configured
    /// switch threshold.
    pub fn maintain_contexts(&mut self) -> Option<ContextSwitch> {
        let current = self.current_context()?;
        let context = self.contexts.get(&current)?;
        if !context.is_blocked() {
            return None;
        }
        // Alternative paths are remediation, not workload; they stay out of
        // the ratio so spawning them cannot mask a stalled context.
        let primary = context
            .thoughts
            .iter()
            .filter(|id| {
                self.thoughts
                    .get(*id)
                    .is_some_and(|thought| thought.kind != ThoughtKind::AlternativePath)
            })
            .count()
            .max(1);
        let blocked = context
            .thoughts
            .iter()
            .filter(|id| self.thoughts.get(*id).is_some_and(Thought::is_blocker))
            .count();
        if (blocked as f32 / primary as f32) < self.config.context_switch_threshold {
            return None;
        }
        self.switch_context(current)
    }

    fn switch_context(&mut self, from: Uuid) -> Option<ContextSwitch> {
        let parent = self.contexts.get(&from)?.parent?;
        let siblings: Vec<Uuid> = self
            .contexts
            .get(&parent)?
            .children
            .iter()
            .filter(|id| **id != from)
            .copied()
            .collect();
        for sibling in siblings {
            let unblocked = self
                .contexts
                .get(&sibling)
                .is_some_and(|context| !context.is_blocked());
            if unblocked {
                self.context_stack.pop();
                self.context_stack.push(sibling);
                let switch = ContextSwitch {
                    from,
                    to: sibling,
                    at: Utc::now(),
                };
                self.switches.push(switch.clone());
                return Some(switch);
            }
        }
        None
    }

    /// Marks a thought resolved.
    pub fn resolve_thought(&mut self, id: Uuid) -> Result<(), EngineError> {
        let thought = self
            .thoughts
            .get_mut(&id)
            .ok_or(EngineError::UnknownThought(id))?;
        thought.resolved = true;
        Ok(())
    }

    /// Registers a work item.
    pub fn insert_work(&mut self, item: WorkItem) {
        self.work_items.insert(item.id, item);
    }

    /// Updates a work item's status.
    pub fn set_work_status(&mut self, id: Uuid, status: WorkStatus) -> Result<(), EngineError> {
        let item = self
            .work_items
            .get_mut(&id)
            .ok_or(EngineError::UnknownWorkItem(id))?;
        item.status = status;
        Ok(())
    }

    /// Completes a work item, recording an optional result payload.
    pub fn complete_work(
        &mut self,
        id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<(), EngineError> {
        let item = self
            .work_items
            .get_mut(&id)
            .ok_or(EngineError::UnknownWorkItem(id))?;
        item.status = WorkStatus::Completed;
        item.result = result;
        Ok(())
    }

    /// Returns a work item to the pending pool, dropping its assignment.
    pub fn reset_work(&mut self, id: Uuid) -> Result<(), EngineError> {
        let item = self
            .work_items
            .get_mut(&id)
            .ok_or(EngineError::UnknownWorkItem(id))?;
        item.status = WorkStatus::Pending;
        item.assigned_to = None;
        Ok(())
    }

    /// Marks a context completed.
    pub fn complete_context(&mut self, id: Uuid) -> Result<(), EngineError> {
        let context = self
            .contexts
            .get_mut(&id)
            .ok_or(EngineError::UnknownContext(id))?;
        context.status = ContextStatus::Completed;
        Ok(())
    }

    /// Work items belonging to one context.
    #[must_use]
    pub fn work_for_context(&self, context: Uuid) -> Vec<WorkItem> {
        self.work_items
            .values()
            .filter(|item| item.context == context)
            .cloned()
            .collect()
    }

    /// Thoughts of a chain resolved against the store, in chain order.
    #[must_use]
    pub fn chain_members(&self, chain: &ReasoningChain) -> Vec<&Thought> {
        chain
            .thoughts
            .iter()
            .filter_map(|id| self.thoughts.get(id))
            .collect()
    }

    /// Aggregate counters for status reporting.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            total_thoughts: self.thoughts.len(),
            recent_thoughts: self.recent.len(),
            contexts: self.contexts.len(),
            reasoning_chains: self.chains.len(),
            work_items: self.work_items.len(),
            alternative_paths: self.alternatives.len(),
            thought_links: self.links.values().map(IndexSet::len).sum(),
            context_switches: self.switches.len(),
            current_context: self.current_context(),
        }
    }

    /// Text rendering of recent thoughts and their relationships.
    #[must_use]
    pub fn thought_graph(&self, limit: usize) -> String {
        let mut out = String::from("Thought Graph (Recent):\n");
        out.push_str(&"=".repeat(50));
        out.push('\n');
        let recent: Vec<Uuid> = self
            .recent
            .iter()
            .rev()
            .take(limit)
            .copied()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        for id in recent {
            let Some(thought) = self.thoughts.get(&id) else {
                continue;
            };
            let kind: String = thought.kind.label().chars().take(4).collect();
            let content: String = thought.content.chars().take(40).collect();
            out.push_str(&format!("\n[{kind}] {content}..."));
            if let Some(parent) = thought.parent {
                out.push_str(&format!("\n  parent: {parent}"));
            }
            if !thought.children.is_empty() {
                out.push_str(&format!("\n  children: {}", thought.children.len()));
            }
            if let Some(linked) = self.links.get(&id) {
                if !linked.is_empty() {
                    out.push_str(&format!("\n  linked: {}", linked.len()));
                }
            }
            if thought.is_blocker() {
                out.push_str("\n  BLOCKER");
                if let Some(alternatives) = self.alternatives.get(&id) {
                    out.push_str(&format!(" -> {} alternatives", alternatives.len()));
                }
            }
        }
        out
    }
}

/// Word-set Jaccard similarity between two contents.
#[must_use]
pub fn jaccard_similarity(a: &str, b: &str) -> f32 {
    let lower_a = a.to_lowercase();
    let lower_b = b.to_lowercase();
    let words_a: IndexSet<&str> = lower_a.split_whitespace().collect();
    let words_b: IndexSet<&str> = lower_b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ThinkingEngine {
        ThinkingEngine::with_seed(EngineConfig::default(), 7).unwrap()
    }

    #[test]
    fn jaccard_matches_word_overlap() {
        assert!((jaccard_similarity("a b c", "a b c") - 1.0).abs() < f32::EPSILON);
        assert!((jaccard_similarity("a b", "b c") - (1.0 / 3.0)).abs() < 1e-6);
        assert!((jaccard_similarity("", "a") - 0.0).abs() < f32::EPSILON);
    }

    #[test]
    fn think_about_builds_a_chain() {
        let mut engine = engine();
        let chain = engine.think_about("improve checkout latency", None, 3).unwrap();
        // Root plus three first-layer perspectives at minimum.
        assert!(chain.thoughts.len() >= 4);
        assert!(chain.confidence > 0.0);
        assert!(chain
            .conclusion
            .as_deref()
            .unwrap()
            .starts_with("Based on"));
        assert!(engine.chain(chain.id).is_some());
    }

    #[test]
    fn empty_topic_is_rejected() {
        let mut engine = engine();
        assert!(matches!(
            engine.think_about("  ", None, 2),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn unknown_context_is_rejected() {
        let mut engine = engine();
        assert!(matches!(
            engine.think_about("topic", Some(Uuid::new_v4()), 2),
            Err(EngineError::UnknownContext(_))
        ));
    }

    #[test]
    fn blocking_content_spawns_alternatives() {
        let mut engine = engine();
        let context = engine.create_context("deploy", None);
        let blocked = engine.create_thought(
            ThoughtKind::Analysis,
            "deploy blocked on missing credentials",
            context,
            1,
            None,
        );
        let first = engine.find_alternative_path(blocked, context).unwrap();
        let alternatives = engine.alternatives_for(blocked).unwrap();
        assert_eq!(alternatives.len(), 3);
        assert_eq!(alternatives[0], first);
        let blocked_thought = engine.thought(blocked).unwrap();
        assert_eq!(blocked_thought.kind, ThoughtKind::BlockerDetection);
        assert!(blocked_thought.action_required);
        assert!(engine
            .thought(first)
            .unwrap()
            .content
            .starts_with("Lateral approach"));
    }

    #[test]
    fn discover_connections_links_similar_thoughts() {
        let mut engine = engine();
        let context = engine.create_context("ops", None);
        let a = engine.create_thought(
            ThoughtKind::Analysis,
            "database latency spike in eu west",
            context,
            0,
            None,
        );
        let b = engine.create_thought(
            ThoughtKind::Connection,
            "database latency spike in eu east",
            context,
            0,
            None,
        );
        let created = engine.discover_connections();
        assert_eq!(created, 1);
        assert!(engine.thought(a).unwrap().links.contains(&b));
        assert!(engine.thought(b).unwrap().links.contains(&a));
        // A second pass does not duplicate the link.
        assert_eq!(engine.discover_connections(), 0);
    }

    #[test]
    fn blocker_scan_blocks_context_and_registers_workarounds() {
        let mut engine = engine();
        let context = engine.create_context("release", None);
        let blocked = engine.create_thought(
            ThoughtKind::BlockerDetection,
            "release stuck on failing smoke tests",
            context,
            0,
            None,
        );
        let newly = engine.scan_for_blockers();
        assert_eq!(newly, vec![context]);
        assert!(engine.context(context).unwrap().is_blocked());
        assert!(engine.alternatives_for(blocked).is_some());
    }

    #[test]
    fn blocked_focus_switches_to_unblocked_sibling() {
        let mut engine = engine();
        let parent = engine.create_context("program", None);
        let stuck = engine.create_context("workstream a", Some(parent));
        let open = engine.create_context("workstream b", Some(parent));
        for _ in 0..2 {
            engine.create_thought(
                ThoughtKind::BlockerDetection,
                "cannot proceed: waiting on vendor",
                stuck,
                0,
                None,
            );
        }
        engine.focus_context(stuck).unwrap();
        engine.scan_for_blockers();
        let switch = engine.maintain_contexts().unwrap();
        assert_eq!(switch.from, stuck);
        assert_eq!(switch.to, open);
        assert_eq!(engine.current_context(), Some(open));
        assert_eq!(engine.status().context_switches, 1);
    }

    #[test]
    fn resolved_blockers_do_not_trigger_switch() {
        let mut engine = engine();
        let parent = engine.create_context("program", None);
        let stuck = engine.create_context("workstream a", Some(parent));
        engine.create_context("workstream b", Some(parent));
        let blocked = engine.create_thought(
            ThoughtKind::BlockerDetection,
            "cannot proceed",
            stuck,
            0,
            None,
        );
        engine.focus_context(stuck).unwrap();
        engine.scan_for_blockers();
        engine.resolve_thought(blocked).unwrap();
        assert!(engine.maintain_contexts().is_none());
    }

    #[test]
    fn status_counts_state() {
        let mut engine = engine();
        engine.think_about("topic one", None, 2).unwrap();
        let status = engine.status();
        assert!(status.total_thoughts >= 4);
        assert_eq!(status.reasoning_chains, 1);
        assert_eq!(status.recent_thoughts, status.total_thoughts);
    }

    #[test]
    fn thought_graph_renders_recent() {
        let mut engine = engine();
        let context = engine.create_context("viz", None);
        engine.create_thought(
            ThoughtKind::Hypothesis,
            "caching will halve the latency",
            context,
            0,
            None,
        );
        let graph = engine.thought_graph(5);
        assert!(graph.starts_with("Thought Graph (Recent):"));
        assert!(graph.contains("[hypo] caching will halve the latency"));
    }
}
