use std::{
    fs::{self, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use cogni_event_bus::FileEventPublisher;
use cognitron_engine::{EngineConfig, EngineTelemetry, ReasonerRuntime};
use cognitron_pipeline::{Cognitron, ProblemStatement};
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "cogni", version, about = "Cognitron deep reasoning engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Thinks deeply about a topic and prints the reasoning chain.
    Think(ThinkArgs),
    /// Runs a problem through the full reasoning pipeline.
    Process(ProcessArgs),
    /// Lists the most recent sessions.
    Sessions {
        /// Number of entries to display.
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value = "cognitron/logs/sessions.jsonl")]
        manifest: PathBuf,
    },
    /// Shows one recorded session as pretty JSON.
    Show {
        session_id: String,
        #[arg(long, default_value = "cognitron/logs/sessions.jsonl")]
        manifest: PathBuf,
    },
}

#[derive(Parser, Debug)]
struct ThinkArgs {
    /// Topic to reason about.
    topic: String,
    /// Recursion depth; defaults to the configured reasoning depth.
    #[arg(long)]
    depth: Option<u32>,
    /// Engine config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "cognitron/logs")]
    log_dir: PathBuf,
    #[arg(long, default_value = "cognitron/logs/sessions.jsonl")]
    manifest: PathBuf,
    /// Optional durable event log (JSONL).
    #[arg(long)]
    event_log: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ProcessArgs {
    /// Problem statement to process.
    statement: String,
    /// JSON file holding the context mapping.
    #[arg(long)]
    context: Option<PathBuf>,
    /// Relevant domain, repeatable.
    #[arg(long = "domain")]
    domains: Vec<String>,
    /// Engine config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "cognitron/logs")]
    log_dir: PathBuf,
    #[arg(long, default_value = "cognitron/logs/sessions.jsonl")]
    manifest: PathBuf,
    /// Optional durable event log (JSONL).
    #[arg(long)]
    event_log: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct SessionEntry {
    session_id: String,
    started_at: DateTime<Utc>,
    kind: String,
    subject: String,
    confidence: f32,
    status: String,
    log_path: PathBuf,
}

impl SessionEntry {
    fn new(kind: &str, subject: &str, confidence: f32, status: &str, log_path: PathBuf) -> Self {
        Self {
            session_id: format!("ses-{}", Uuid::new_v4()),
            started_at: Utc::now(),
            kind: kind.into(),
            subject: subject.into(),
            confidence,
            status: status.into(),
            log_path,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Think(args) => handle_think(args),
        Commands::Process(args) => handle_process(args),
        Commands::Sessions { limit, manifest } => {
            let entries = read_manifest(&manifest)?;
            for entry in entries.into_iter().rev().take(limit) {
                println!(
                    "{} | {} | {} | {:.2} | {}",
                    entry.session_id, entry.kind, entry.status, entry.confidence, entry.subject
                );
            }
            Ok(())
        }
        Commands::Show {
            session_id,
            manifest,
        } => {
            let entries = read_manifest(&manifest)?;
            if let Some(entry) = entries.into_iter().find(|e| e.session_id == session_id) {
                println!("{}", serde_json::to_string_pretty(&entry)?);
            } else {
                println!("session {session_id} not found");
            }
            Ok(())
        }
    }
}

fn handle_think(args: ThinkArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let log_path = args.log_dir.join("engine.log");
    let telemetry = build_telemetry("engine", &log_path, args.event_log.as_deref())?;
    let runtime = ReasonerRuntime::new(config, Some(telemetry))?;
    let rt = Runtime::new()?;
    let chain = rt.block_on(runtime.think_about(&args.topic, args.depth))?;
    println!("{}", serde_json::to_string_pretty(&chain)?);
    let entry = SessionEntry::new("think", &args.topic, chain.confidence, "completed", log_path);
    append_manifest(&args.manifest, &entry)?;
    Ok(())
}

fn handle_process(args: ProcessArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let log_path = args.log_dir.join("pipeline.log");
    let telemetry = build_telemetry("pipeline", &log_path, args.event_log.as_deref())?;
    let cognitron = Cognitron::with_telemetry(config, Some(telemetry))?;
    let mut problem = ProblemStatement::new(&args.statement)?;
    if let Some(path) = &args.context {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading context file {}", path.display()))?;
        let value: Value = serde_json::from_str(&raw)?;
        let map = value
            .as_object()
            .cloned()
            .context("context file must hold a JSON object")?;
        problem = problem.with_context(map);
    }
    if !args.domains.is_empty() {
        problem = problem.with_domains(args.domains.clone());
    }
    let rt = Runtime::new()?;
    let report = rt.block_on(cognitron.process(&problem))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    let status = if report.accepted { "accepted" } else { "rejected" };
    let entry = SessionEntry::new(
        "process",
        &args.statement,
        report.confidence,
        status,
        log_path,
    );
    append_manifest(&args.manifest, &entry)?;
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn build_telemetry(
    module: &str,
    log_path: &Path,
    event_log: Option<&Path>,
) -> Result<EngineTelemetry> {
    let mut builder = EngineTelemetry::builder(module).log_path(log_path);
    if let Some(path) = event_log {
        builder = builder.publisher(Arc::new(FileEventPublisher::new(path)?));
    }
    builder.build()
}

fn read_manifest(path: &Path) -> Result<Vec<SessionEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

fn append_manifest(path: &Path, entry: &SessionEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    serde_json::to_writer(&mut file, entry)?;
    file.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn manifest_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs/sessions.jsonl");
        let entry = SessionEntry::new(
            "think",
            "test topic",
            0.75,
            "completed",
            dir.path().join("engine.log"),
        );
        append_manifest(&path, &entry).unwrap();
        append_manifest(
            &path,
            &SessionEntry::new("process", "other", 0.4, "rejected", path.clone()),
        )
        .unwrap();
        let entries = read_manifest(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].session_id, entry.session_id);
        assert_eq!(entries[1].status, "rejected");
    }

    #[test]
    fn missing_manifest_reads_empty() {
        let dir = tempdir().unwrap();
        let entries = read_manifest(&dir.path().join("absent.jsonl")).unwrap();
        assert!(entries.is_empty());
    }
}
