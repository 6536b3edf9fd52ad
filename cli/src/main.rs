//! CLI entrypoint for the council consensus engine
//!
//! Wires the layers together with dependency injection and runs one
//! meeting (review consensus or planned approval) against a scenario
//! file.

mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use council_application::ports::speech::NoSpeechPublisher;
use council_application::{
    ConsensusEngine, OneShotGateway, PlannedApprovalInput, PlannedRun, ReviewConsensusInput,
};
use council_domain::{Department, KeywordClassifier, Locale, MeetingKind};
use council_infrastructure::{
    CannedGateway, CommandGateway, ConfigLoader, FileConfig, InMemoryMinutesStore,
    JsonlMinutesJournal, TtlPresenceTracker,
};
use scenario::Scenario;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "council", about = "Meeting-based consensus engine", version)]
struct Cli {
    /// Scenario file describing the task and its leaders
    scenario: PathBuf,

    /// Run the single-round kickoff approval instead of review consensus
    #[arg(long)]
    planned: bool,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Answer every turn with this fixed reply instead of spawning the
    /// gateway command (for dry runs)
    #[arg(long, value_name = "REPLY")]
    canned: Option<String>,

    /// Notice locale (en or ja), overriding the config file
    #[arg(long)]
    locale: Option<String>,

    /// JSONL minutes journal path, overriding the config file
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Working directory handed to the gateway command
    #[arg(long)]
    project_path: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    let scenario = Scenario::load(&cli.scenario)?;
    info!(task = %scenario.task.id, "scenario loaded");

    match &cli.canned {
        Some(reply) => {
            let gateway = Arc::new(CannedGateway::new(reply.clone()));
            run(&cli, &config, &scenario, gateway).await
        }
        None => {
            let gateway = Arc::new(
                CommandGateway::new(config.gateway.command.clone())
                    .with_args(config.gateway.args.clone()),
            );
            run(&cli, &config, &scenario, gateway).await
        }
    }
}

async fn run<G: OneShotGateway + 'static>(
    cli: &Cli,
    config: &FileConfig,
    scenario: &Scenario,
    gateway: Arc<G>,
) -> Result<()> {
    // === Dependency injection ===
    let directory = Arc::new(scenario.seed_directory());

    let mut minutes = InMemoryMinutesStore::new();
    let journal_path = cli.journal.clone().or(config.meeting.journal_path.clone());
    if let Some(path) = journal_path {
        let journal = JsonlMinutesJournal::new(&path)
            .with_context(|| format!("creating minutes journal {}", path.display()))?;
        minutes = minutes.with_journal(journal);
    }
    let minutes = Arc::new(minutes);

    let classifier = Arc::new(KeywordClassifier);
    let presence = Arc::new(TtlPresenceTracker::new(
        directory.clone(),
        classifier.clone(),
        Arc::new(NoSpeechPublisher),
        config.consensus.presence_hold_ms,
    ));

    let locale = match cli.locale.as_deref() {
        Some("ja") => Locale::Ja,
        Some(_) => Locale::En,
        None => config.meeting.locale(),
    };

    let engine = ConsensusEngine::new(
        gateway,
        minutes.clone(),
        presence,
        directory.clone(),
        classifier,
        config.consensus.clone(),
    );

    let task_id = scenario.task.id.clone();
    let fallback = Department::new(scenario.task.department.clone());

    if cli.planned {
        let mut input = PlannedApprovalInput::new(&task_id, &scenario.task.title, fallback)
            .with_locale(locale);
        input.project_path = cli.project_path.clone();

        let run = engine
            .start_planned_approval(input, |items| {
                println!("Kickoff approved with {} action item(s).", items.len());
            })
            .await?;

        match &run {
            PlannedRun::Completed(outcome) => {
                for item in &outcome.plan_items {
                    println!("  - {}", item);
                }
                if outcome.has_supplement_signals {
                    println!("(supplement signals were raised during kickoff)");
                }
            }
            other => println!("Kickoff ended without approval: {:?}", other),
        }
        print_minutes(&*minutes, &task_id, MeetingKind::Planned).await;
    } else {
        let mut input = ReviewConsensusInput::new(&task_id, &scenario.task.title, fallback)
            .with_locale(locale);
        input.project_path = cli.project_path.clone();

        let outcome = engine
            .start_review_consensus(input, || {
                println!("Review approved; the task can close.");
            })
            .await?;

        println!("Outcome: {}", outcome);
        for notice in directory.notices(&task_id) {
            println!("Notice: {}", notice);
        }
        for memo in directory.memos(&task_id) {
            println!("Memo: {}", memo);
        }
        print_minutes(&*minutes, &task_id, MeetingKind::Review).await;
    }

    Ok(())
}

async fn print_minutes(minutes: &InMemoryMinutesStore, task_id: &str, kind: MeetingKind) {
    use council_application::ports::minutes::MinutesRecorder;

    let Ok(Some(meeting)) = minutes.latest_for_task(task_id, kind).await else {
        return;
    };
    println!();
    println!(
        "Minutes of {} (round {}, {:?}):",
        meeting.title, meeting.round, meeting.status
    );
    for entry in &meeting.entries {
        println!(
            "  {:>3}. [{} / {}] {}",
            entry.seq,
            entry.speaker,
            entry.department,
            entry.content.lines().next().unwrap_or("")
        );
    }
}
