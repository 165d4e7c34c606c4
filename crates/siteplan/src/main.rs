use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use serde::Serialize;
use siteplan_core::config::{ResolvedSettings, load_config, resolve_config_path};
use siteplan_core::inputs::{load_inventory, load_query_lookup, load_topics};
use siteplan_core::model::{InventoryPage, MatchOutcome, StrategyTopic};
use siteplan_core::report::{build_plan_report, summarize_overlay};
use siteplan_core::{
    PlanInput, QueryLookup, compute_overlay_with, generate_plan_with, match_pages_with,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "siteplan",
    version,
    about = "Match a site's page inventory against a topical map and plan the migration"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Engine config (TOML)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print JSON instead of key: value lines")]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    config: Option<PathBuf>,
    json: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            json: cli.json,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Match every page to its best topic and list gaps")]
    Match(EngineArgs),
    #[command(about = "Classify topic coverage from existing page-to-topic mappings")]
    Overlay(OverlayArgs),
    #[command(about = "Build the prioritized remediation plan")]
    Plan(EngineArgs),
    #[command(about = "Print the effective engine settings")]
    Config,
}

#[derive(Debug, Args)]
struct EngineArgs {
    #[arg(long, value_name = "PATH", help = "Page inventory (.json/.yaml)")]
    inventory: PathBuf,
    #[arg(long, value_name = "PATH", help = "Topical map topics (.json/.yaml)")]
    topics: PathBuf,
    #[arg(long, value_name = "PATH", help = "Search queries per URL (.json/.yaml)")]
    queries: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct OverlayArgs {
    #[arg(long, value_name = "PATH")]
    inventory: PathBuf,
    #[arg(long, value_name = "PATH")]
    topics: PathBuf,
}

struct LoadedInputs {
    inventory: Vec<InventoryPage>,
    topics: Vec<StrategyTopic>,
    queries: Option<QueryLookup>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Match(args)) => run_match(&runtime, args),
        Some(Commands::Overlay(args)) => run_overlay(&runtime, args),
        Some(Commands::Plan(args)) => run_plan(&runtime, args),
        Some(Commands::Config) => run_config(&runtime),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SITEPLAN_LOG")
        .unwrap_or_else(|_| EnvFilter::new("siteplan=info,siteplan_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_match(runtime: &RuntimeOptions, args: EngineArgs) -> Result<()> {
    let settings = load_settings(runtime)?;
    let inputs = load_inputs(&args)?;
    let outcome = match_pages_with(
        &inputs.inventory,
        &inputs.topics,
        inputs.queries.as_ref(),
        &settings.matching,
    );

    if runtime.json {
        return print_json(&outcome);
    }

    println!("match");
    print_match_stats(&outcome);
    for result in &outcome.matches {
        println!(
            "match.{}: {} topic={} confidence={:.2}",
            result.category.as_str(),
            result.page_url,
            result.topic_id.as_deref().unwrap_or("<none>"),
            result.confidence
        );
        for url in &result.competing_urls {
            println!("  competes_with: {url}");
        }
    }
    for gap in &outcome.gaps {
        println!(
            "gap.{}: {} ({})",
            gap.importance.as_str(),
            gap.title,
            gap.topic_id
        );
    }
    Ok(())
}

fn run_overlay(runtime: &RuntimeOptions, args: OverlayArgs) -> Result<()> {
    let settings = load_settings(runtime)?;
    let inventory = load_inventory(&args.inventory)?;
    let topics = load_topics(&args.topics)?;
    let nodes = compute_overlay_with(&topics, &inventory, &settings.overlay);

    if runtime.json {
        return print_json(&nodes);
    }

    let summary = summarize_overlay(&nodes);
    println!("overlay");
    println!("overlay.total_nodes: {}", summary.total_nodes);
    for (status, count) in &summary.by_status {
        println!("overlay.status.{status}: {count}");
    }
    for node in &nodes {
        println!(
            "node.{}: {} pages={} alignment={}",
            node.status.as_str(),
            node.title,
            node.matched_pages.len(),
            node.alignment_score
                .map(|score| format!("{score:.1}"))
                .unwrap_or_else(|| "n/a".to_string())
        );
    }
    Ok(())
}

fn run_plan(runtime: &RuntimeOptions, args: EngineArgs) -> Result<()> {
    let settings = load_settings(runtime)?;
    let inputs = load_inputs(&args)?;
    let outcome = match_pages_with(
        &inputs.inventory,
        &inputs.topics,
        inputs.queries.as_ref(),
        &settings.matching,
    );
    let actions = generate_plan_with(
        &PlanInput {
            inventory: &inputs.inventory,
            topics: &inputs.topics,
            outcome: &outcome,
        },
        &settings.plan,
    );
    let report = build_plan_report(actions)?;
    info!(
        actions = report.summary.total_actions,
        fingerprint = %report.fingerprint,
        "plan ready"
    );

    if runtime.json {
        return print_json(&report);
    }

    println!("plan");
    println!("plan.fingerprint: {}", report.fingerprint);
    println!("plan.total_actions: {}", report.summary.total_actions);
    println!("plan.clicks_at_stake: {}", report.summary.clicks_at_stake);
    for (action, count) in &report.summary.by_action {
        println!("plan.action.{action}: {count}");
    }
    for (priority, count) in &report.summary.by_priority {
        println!("plan.priority.{priority}: {count}");
    }
    for action in &report.actions {
        let source = if action.source_url.is_empty() {
            action.topic_id.as_deref().unwrap_or("<new>")
        } else {
            action.source_url.as_str()
        };
        println!(
            "[{}] {} {} (effort {})",
            action.priority.as_str(),
            action.action.as_str(),
            source,
            action.effort.as_str()
        );
        println!("  {}", action.reasoning);
        if let Some(target) = &action.merge_target_url {
            println!("  merge_into: {target}");
        }
    }
    Ok(())
}

fn run_config(runtime: &RuntimeOptions) -> Result<()> {
    let config_path = config_path(runtime)?;
    let ResolvedSettings {
        matching,
        overlay,
        plan,
    } = load_config(&config_path)?.resolve()?;

    println!(
        "config_path: {} ({})",
        normalize_path(&config_path),
        if config_path.exists() { "found" } else { "missing" }
    );
    println!("matching.match_threshold: {}", matching.match_threshold);
    println!(
        "matching.cannibalization_threshold: {}",
        matching.cannibalization_threshold
    );
    println!("matching.h1_weight: {}", matching.h1_weight);
    println!("matching.title_weight: {}", matching.title_weight);
    println!("matching.url_weight: {}", matching.url_weight);
    println!("matching.query_weight: {}", matching.query_weight);
    println!("overlay.aligned_threshold: {}", overlay.aligned_threshold);
    println!("plan.keep_min_score: {}", plan.keep_min_score);
    println!("plan.optimize_min_score: {}", plan.optimize_min_score);
    println!("plan.redirect_min_clicks: {}", plan.redirect_min_clicks);
    println!("plan.prune_max_score: {}", plan.prune_max_score);
    Ok(())
}

fn load_inputs(args: &EngineArgs) -> Result<LoadedInputs> {
    let inventory = load_inventory(&args.inventory)?;
    let topics = load_topics(&args.topics)?;
    let queries = args
        .queries
        .as_deref()
        .map(load_query_lookup)
        .transpose()?;
    Ok(LoadedInputs {
        inventory,
        topics,
        queries,
    })
}

fn load_settings(runtime: &RuntimeOptions) -> Result<ResolvedSettings> {
    load_config(&config_path(runtime)?)?
        .resolve()
        .context("invalid engine settings")
}

fn config_path(runtime: &RuntimeOptions) -> Result<PathBuf> {
    let project_root = env::current_dir().context("failed to resolve current directory")?;
    Ok(resolve_config_path(
        runtime.config.as_deref(),
        &project_root,
    ))
}

fn print_match_stats(outcome: &MatchOutcome) {
    let stats = &outcome.stats;
    println!("stats.total_pages: {}", stats.total_pages);
    println!("stats.total_topics: {}", stats.total_topics);
    println!("stats.matched: {}", stats.matched);
    println!("stats.orphans: {}", stats.orphans);
    println!("stats.cannibalization: {}", stats.cannibalization);
    println!("stats.gaps: {}", stats.gaps);
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
