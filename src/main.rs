mod ai;
mod cli;
mod config;
mod docs;
mod document;
mod error;
mod git;
mod meeting;
mod metrics;
mod notify;
mod period;
mod pipeline;
mod reports;

use ai::Synthesizer;
use anyhow::Context;
use clap::Parser as _;
use cli::{Cli, Commands, NotifyTarget, RunArgs};
use config::Config;
use git::parser::Parser;
use git::CommitRecord;
use indicatif::{ProgressBar, ProgressStyle};
use period::ReportKey;
use pipeline::{local_now, Pipeline, ReportRequest, RunOutcome, UpdateRequest};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_tracing(cli.verbose);

    // Init needs no existing config
    if let Commands::Init { force } = cli.command {
        return handle_init(cli.config.as_deref(), force);
    }

    let config = Config::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_env_overrides();
    config.validate().context("Invalid configuration")?;

    run(cli.command, config).await
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level by one step
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, config: Config) -> anyhow::Result<()> {
    match command {
        Commands::Daily { date, run } | Commands::Weekly { range: date, run } => {
            run_report(config, date, &run).await
        }
        Commands::Update {
            date,
            range,
            meeting_date,
            narrative,
        } => {
            // validate() guarantees one of the two
            let key = date
                .or(range)
                .context("update requires either --date or --range")?;
            run_update(config, key, meeting_date, narrative).await
        }
        Commands::Notify { target } => run_notify(config, target).await,
        Commands::Summary { docs_root, out } => {
            let docs_root = docs_root.unwrap_or_else(|| config.docs_root.clone());
            let path = pipeline::write_summary(&config, &docs_root, out.as_deref())
                .with_context(|| format!("Failed to index {}", docs_root.display()))?;
            println!("✓ Table of contents: {}", path.display());
            Ok(())
        }
        Commands::PrBody { base, repo } => {
            let base = base.unwrap_or_else(|| config.base_branch.clone());
            let source = Parser::new(repo.unwrap_or_else(|| PathBuf::from(".")));
            let pipeline = Pipeline::new(config, source, Synthesizer::new(None));
            print!("{}", pipeline.pr_body(&base));
            Ok(())
        }
        Commands::Config => {
            let toml_str = toml::to_string_pretty(&config.masked())?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
            Ok(())
        }
        Commands::Init { .. } => Ok(()),
    }
}

fn synthesizer(config: &Config, narrative: bool) -> Synthesizer {
    if !narrative {
        return Synthesizer::new(None);
    }

    let synthesizer = Synthesizer::from_config(config);
    if !synthesizer.is_enabled() {
        warn!("Narrative requested but no API key is configured; writing placeholders");
    }
    synthesizer
}

async fn run_report(config: Config, key: ReportKey, args: &RunArgs) -> anyhow::Result<()> {
    println!("devlog v{}", env!("CARGO_PKG_VERSION"));

    let narrative = args.narrative_enabled(config.narrative_enabled);
    let request = ReportRequest {
        key: key.clone(),
        branch: args.branch.clone(),
        base_branch: args.base.clone(),
        reports: args.report_paths(),
        meeting_date: args.meeting_date,
        narrative,
    };

    let generated_at = local_now(&config);
    let source = Parser::new(args.repo.clone().unwrap_or_else(|| PathBuf::from(".")));
    let synthesizer = synthesizer(&config, narrative);
    let pipeline = Pipeline::new(config, source, synthesizer);

    let spinner = spinner(&format!("Building {} report...", key));
    let outcome = pipeline.run_report(&request, generated_at).await;
    spinner.finish_and_clear();

    let outcome = outcome.with_context(|| format!("Failed to build report for {}", key))?;
    print_outcome(&outcome);
    Ok(())
}

async fn run_update(
    config: Config,
    key: ReportKey,
    meeting_date: Option<chrono::NaiveDate>,
    narrative: bool,
) -> anyhow::Result<()> {
    let request = UpdateRequest {
        key: key.clone(),
        meeting_date,
        narrative,
    };

    let now = local_now(&config);
    let synthesizer = synthesizer(&config, narrative);
    let pipeline = Pipeline::new(config, Vec::<CommitRecord>::new(), synthesizer);

    let spinner = spinner(&format!("Updating {} report...", key));
    let outcome = pipeline.update(&request, now).await;
    spinner.finish_and_clear();

    let outcome = outcome.with_context(|| format!("Failed to update report for {}", key))?;
    print_outcome(&outcome);
    Ok(())
}

async fn run_notify(config: Config, target: NotifyTarget) -> anyhow::Result<()> {
    let now = local_now(&config);

    let sent = match target {
        NotifyTarget::Daily { key, url } | NotifyTarget::Weekly { key, url } => {
            pipeline::notify_report(&config, &key, url, now)
                .await
                .with_context(|| format!("Failed to announce {}", key))?
        }
        NotifyTarget::Meeting {
            file,
            commit_message,
            commit_url,
        } => pipeline::notify_meeting(&config, &file, commit_message.as_deref(), commit_url, now)
            .await
            .with_context(|| format!("Failed to announce {}", file.display()))?,
        NotifyTarget::Meetings { manifest, base_url } => {
            let count = pipeline::notify_meetings(&config, &manifest, base_url.as_deref())
                .await
                .context("Failed to announce meeting notes")?;
            println!("✓ Announced {} meeting note(s)", count);
            return Ok(());
        }
    };

    if sent {
        println!("✓ Notification sent");
    } else {
        println!("Webhook not configured; notification skipped");
    }
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    println!("✓ Metrics: {}", outcome.metrics_path.display());
    println!("✓ Report: {}", outcome.report_path.display());
    println!(
        "  {} commit(s) by {} author(s), +{} / -{} lines",
        outcome.metrics.commit_count,
        outcome.metrics.author_count,
        outcome.metrics.additions,
        outcome.metrics.deletions
    );
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn handle_init(explicit: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let config_path = match explicit {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };

    if config_path.exists() && !force {
        eprintln!("Config file already exists at: {}", config_path.display());
        eprintln!("Use --force to overwrite");
        std::process::exit(1);
    }

    Config::create_default(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("✓ Created config file at: {}", config_path.display());
    println!("\nTo enable narrative sections, either:");
    println!("  1. Set the ANTHROPIC_AUTH_TOKEN or ANTHROPIC_API_KEY environment variable");
    println!("  2. Add api_key to the config file:");
    println!("     api_key = \"sk-ant-YOUR_KEY_HERE\"");
    Ok(())
}
