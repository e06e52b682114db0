//! CLI for wegfinder.
//!
//! Runs the navigator against the simulated sign-up flow, with an
//! OpenAI-compatible service as advisory backend. Writes a per-step trace to
//! stderr, the final action list to stdout, and optionally a JSON run report.

mod openai;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wegfinder_agent::{Navigator, NavigatorConfig, RetryPolicy, RunOutcome};
use wegfinder_core::{Action, State, Task, Termination, TransitionTable};
use wegfinder_feedback::{FeedbackAnalyzer, RunReport};

use crate::openai::{OpenAiAdvisory, OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variables checked for the api key, in order.
const API_KEY_VARS: [&str; 2] = ["OPEN_AI_KEY", "OPENAI_API_KEY"];

const EXIT_NO_ACTIONS: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Navigate the simulated sign-up flow towards a goal state
    Run(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// State the run starts in
    #[arg(long, default_value = "Home Page")]
    initial_state: String,

    /// Natural-language goal of the run
    #[arg(long, default_value = "Complete the sign-up flow")]
    task: String,

    /// Reaching this state ends the run successfully
    #[arg(long, default_value = "Dashboard")]
    goal_state: String,

    /// Maximum number of actions before the run stops
    #[arg(long, default_value = "10")]
    max_actions: usize,

    /// Chat model used for proposals and scoring
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Response length ceiling (tokens) for each advisory call
    #[arg(long, default_value = "50")]
    max_tokens: u32,

    /// Timeout per advisory call in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Attempts per advisory call before the run is aborted
    #[arg(long, default_value = "3")]
    retries: u32,

    /// Initial backoff between attempts in milliseconds (doubles per retry)
    #[arg(long, default_value = "500")]
    retry_delay_ms: u64,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl RunArgs {
    fn navigator_config(&self) -> NavigatorConfig {
        NavigatorConfig {
            termination: Termination {
                goal_state: State::from(self.goal_state.as_str()),
                max_actions: self.max_actions,
            },
            retry: RetryPolicy::new(
                self.retries,
                Duration::from_millis(self.retry_delay_ms),
                Duration::from_secs(self.timeout_secs),
            ),
            max_tokens: self.max_tokens,
        }
    }

    fn openai_config(&self, api_key: String) -> OpenAiConfig {
        OpenAiConfig {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Reads the api key once at startup, after `.env` has been loaded. A missing
/// or blank key is fatal.
fn resolve_api_key() -> Result<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .with_context(|| format!("No api key provided: set {}", API_KEY_VARS.join(" or ")))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

fn format_history(history: &[Action]) -> String {
    history
        .iter()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

fn exit_code(outcome: RunOutcome) -> ExitCode {
    match outcome {
        RunOutcome::GoalReached | RunOutcome::BudgetExhausted => ExitCode::SUCCESS,
        RunOutcome::NoActionsAvailable => ExitCode::from(EXIT_NO_ACTIONS),
    }
}

async fn run(args: RunArgs) -> Result<ExitCode> {
    let api_key = resolve_api_key()?;
    let advisory = OpenAiAdvisory::new(args.openai_config(api_key))
        .context("Failed to build advisory client")?;

    let mut navigator = Navigator::new(
        advisory,
        TransitionTable::sign_up_flow(),
        State::from(args.initial_state.as_str()),
        Task::from(args.task.as_str()),
        args.navigator_config(),
    );

    // Registered once so a Ctrl-C between two steps is not lost.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let outcome = loop {
        if let wegfinder_agent::Phase::Done(outcome) = navigator.phase() {
            break outcome;
        }
        let step = tokio::select! {
            res = navigator.step() => Some(res),
            _ = &mut ctrl_c => None,
        };
        match step {
            Some(result) => {
                result.context("Navigation aborted")?;
            }
            None => {
                warn!(
                    actions = navigator.history().len(),
                    "cancelled, stopping between iterations"
                );
                println!(
                    "Navigation cancelled. Action History: [{}]",
                    format_history(navigator.history())
                );
                return Ok(ExitCode::from(EXIT_CANCELLED));
            }
        }
    };

    info!(?outcome, state = %navigator.current_state(), "navigation completed");
    println!(
        "Task Completed ({}). Action History: [{}]",
        match outcome {
            RunOutcome::GoalReached => "goal reached",
            RunOutcome::BudgetExhausted => "action budget exhausted",
            RunOutcome::NoActionsAvailable => "no actions available",
        },
        format_history(navigator.history())
    );

    if let Some(path) = &args.report {
        let report = FeedbackAnalyzer::default().report_for(&navigator, outcome);
        for pattern in &report.patterns {
            warn!(%pattern, "feedback pattern");
        }
        save_report(&report, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(exit_code(outcome))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A local .env may carry OPEN_AI_KEY / OPENAI_BASE_URL; real env vars win.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Run(args) => run(args).await,
    }
}
