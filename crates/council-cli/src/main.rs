//! Command-line runner for a deliberation run
//!
//! Streams the pipeline's cumulative snapshots through the completion
//! tracker, logging each field completion exactly once, then extracts the
//! decision signal, persists the report, and delivers it by mail. Only a
//! stage failure or an unparseable decision aborts the run; persistence and
//! delivery problems are logged and the run still counts as successful.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use council_agents::{CouncilConfig, build_pipeline};
use council_engine::{
    AnalysisState, AnalystKind, CompletionTracker, TradeSignal, assemble,
};
use council_llm::{ContentBlock, LLMProvider, OpenAIProvider};
use council_notify::{Mailer, MailerConfig, ReportWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(about = "Multi-stage trading deliberation runner", long_about = None)]
struct Args {
    /// Asset to deliberate on (e.g. BTC)
    #[arg(short, long)]
    asset: String,

    /// Target trade date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Comma-separated analyst stages to enable
    #[arg(long, default_value = "market,sentiment,news")]
    analysts: String,

    /// Path to the operator preferences file ('#' lines are comments)
    #[arg(long, default_value = "investment_preferences")]
    preferences_file: PathBuf,

    /// Paths to supplementary report files, passed to the stages in order
    #[arg(long = "external-report")]
    external_reports: Vec<PathBuf>,

    /// Directory for persisted reports
    #[arg(long, default_value = "reports")]
    report_dir: PathBuf,

    /// Skip report persistence
    #[arg(long)]
    no_save: bool,

    /// Deliver the persisted report through the mail gateway
    #[arg(long)]
    email: bool,

    /// Model identifier override
    #[arg(long)]
    model: Option<String>,

    /// Bull/bear research debate rounds
    #[arg(long)]
    debate_rounds: Option<u32>,

    /// Risky/safe/neutral risk debate rounds
    #[arg(long)]
    risk_rounds: Option<u32>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    council_utils::init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("analysis run failed: {e:#}");
            send_failure_alert(&format!("An error occurred during the analysis: {e:#}")).await;
            Err(e)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let analysts = parse_analysts(&args.analysts)?;
    let date = args
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let preferences = load_preferences(&args.preferences_file);
    let external_reports = load_external_reports(&args.external_reports)?;

    let mut config_builder = CouncilConfig::builder();
    if let Some(model) = &args.model {
        config_builder = config_builder.model(model);
    }
    if let Some(rounds) = args.debate_rounds {
        config_builder = config_builder.debate_rounds(rounds);
    }
    if let Some(rounds) = args.risk_rounds {
        config_builder = config_builder.risk_rounds(rounds);
    }
    let config = config_builder.build()?;

    let provider: Arc<dyn LLMProvider> = Arc::new(OpenAIProvider::from_env()?);
    let pipeline = build_pipeline(&provider, &config, &analysts);
    let initial = AnalysisState::new(&args.asset, date, preferences, external_reports);

    let mut tracker = CompletionTracker::new();
    let final_state = pipeline
        .run(initial, |snapshot| {
            if let Some(last) = snapshot.messages.last() {
                for block in last.tool_uses() {
                    if let ContentBlock::ToolUse { name, input, .. } = block {
                        info!("tool call: {} with args: {}", name, input);
                    }
                }
            }
            for event in tracker.observe(snapshot) {
                info!("--- {} ---", event.label);
            }
        })
        .await?;

    let decision = match TradeSignal::extract(
        final_state.final_trade_decision.as_deref().unwrap_or_default(),
    ) {
        Ok(decision) => decision,
        Err(e) => {
            // Keep the terminal state around for diagnostics even though no
            // report can be persisted.
            dump_state_for_diagnostics(&args.report_dir, &args.asset, date, &final_state);
            return Err(e.into());
        }
    };
    info!("Final decision: {decision}");

    if args.no_save {
        return Ok(());
    }

    // A missing section is a data-integrity problem worth shouting about,
    // but per the propagation policy it does not unwind a completed run.
    let sections = match assemble(&final_state, &analysts, decision) {
        Ok(sections) => sections,
        Err(e) => {
            error!("report assembly failed: {e}");
            return Ok(());
        }
    };

    let writer = ReportWriter::new(&args.report_dir);
    let path = match writer.write(&args.asset, date, &sections, decision) {
        Ok(path) => {
            info!("Report saved to {}", path.display());
            path
        }
        Err(e) => {
            warn!("failed to persist report: {e}");
            return Ok(());
        }
    };

    if args.email {
        match MailerConfig::from_env() {
            Ok(mail_config) => {
                let mailer = Mailer::new(mail_config);
                let subject = format!("{} Trading Report - {} - {}", args.asset, date, decision);
                let body = std::fs::read_to_string(&path).unwrap_or_else(|_| {
                    format!("Report persisted at {} (body unavailable)", path.display())
                });
                if let Err(e) = mailer.send_report(&subject, &body).await {
                    warn!("email delivery failed: {e}");
                }
            }
            Err(e) => warn!("mail gateway not configured: {e}"),
        }
    }

    Ok(())
}

/// Parse the comma-separated analyst list; must be non-empty
fn parse_analysts(input: &str) -> anyhow::Result<Vec<AnalystKind>> {
    let mut kinds = Vec::new();
    for part in input.split(',').filter(|p| !p.trim().is_empty()) {
        let kind = part
            .parse::<AnalystKind>()
            .map_err(|e| anyhow::anyhow!(e))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    anyhow::ensure!(!kinds.is_empty(), "at least one analyst must be enabled");
    Ok(kinds)
}

/// Load operator preferences, stripping comment lines; missing file is fine
fn load_preferences(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => council_utils::strip_comment_lines(&content),
        Err(_) => {
            warn!(
                "preferences file not found at {}; using defaults",
                path.display()
            );
            String::new()
        }
    }
}

/// Read the supplementary report files, preserving argument order
fn load_external_reports(paths: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("reading external report {}", path.display()))
        })
        .collect()
}

/// Persist the terminal state as JSON when no report can be produced
fn dump_state_for_diagnostics(dir: &Path, asset: &str, date: NaiveDate, state: &AnalysisState) {
    let Ok(json) = serde_json::to_string_pretty(state) else {
        return;
    };
    if std::fs::create_dir_all(dir).is_ok() {
        let path = dir.join(format!("{asset}_{date}_state.json"));
        match std::fs::write(&path, json) {
            Ok(()) => info!("terminal state dumped to {}", path.display()),
            Err(e) => warn!("failed to dump terminal state: {e}"),
        }
    }
}

async fn send_failure_alert(body: &str) {
    match MailerConfig::from_env() {
        Ok(config) => {
            if let Err(e) = Mailer::new(config).send_alert(body).await {
                warn!("failure alert delivery failed: {e}");
            }
        }
        Err(e) => warn!("mail gateway not configured; skipping failure alert: {e}"),
    }
}
