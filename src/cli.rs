use crate::period::ReportKey;
use crate::reports::ReportPaths;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "devlog")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Turns repository activity into daily and weekly development logs",
    long_about = "devlog mines the commit history of a time window, classifies and ranks \
                  the changes, merges build, test and static-analysis results into a \
                  metrics snapshot, and publishes a Markdown report whose sections are \
                  updated in place on every run."
)]
pub struct Cli {
    /// Path to config file (default: ~/.config/devlog/config.toml)
    #[arg(short, long, value_name = "FILE", global = true, env = "DEVLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the daily metrics snapshot and report
    Daily {
        /// Day to report on
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_daily_key)]
        date: ReportKey,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Build the weekly metrics snapshot and report
    Weekly {
        /// ISO week to report on
        #[arg(long, value_name = "YYYY-Www", value_parser = parse_weekly_key)]
        range: ReportKey,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Republish a report from its stored metrics without reading commits
    Update {
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_daily_key, conflicts_with = "range")]
        date: Option<ReportKey>,

        #[arg(long, value_name = "YYYY-Www", value_parser = parse_weekly_key)]
        range: Option<ReportKey>,

        /// Meeting note to link (daily default: the previous day)
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
        meeting_date: Option<NaiveDate>,

        /// Regenerate the narrative sections
        #[arg(long)]
        narrative: bool,
    },

    /// Send a chat notification
    Notify {
        #[command(subcommand)]
        target: NotifyTarget,
    },

    /// Regenerate SUMMARY.md for the documentation tree
    Summary {
        /// Documentation root (default: docs_root from config)
        #[arg(value_name = "DOCS_ROOT")]
        docs_root: Option<PathBuf>,

        /// Output file (default: <DOCS_ROOT>/SUMMARY.md)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Print a pull-request body for the commits on the current branch
    PrBody {
        /// Base revision (default: base_branch from config)
        #[arg(long, value_name = "REF")]
        base: Option<String>,

        /// Repository path (default: current directory)
        #[arg(long, value_name = "DIR")]
        repo: Option<PathBuf>,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand, Debug)]
pub enum NotifyTarget {
    /// Announce a daily report
    Daily {
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_daily_key)]
        key: ReportKey,

        /// Link for the embed title (default: derived from publish_base_url)
        #[arg(long)]
        url: Option<String>,
    },

    /// Announce a weekly report
    Weekly {
        #[arg(long, value_name = "YYYY-Www", value_parser = parse_weekly_key)]
        key: ReportKey,

        #[arg(long)]
        url: Option<String>,
    },

    /// Announce one meeting note
    Meeting {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        commit_message: Option<String>,

        #[arg(long)]
        commit_url: Option<String>,
    },

    /// Announce every meeting note listed in a manifest
    Meetings {
        /// Newline-delimited list of changed meeting notes
        #[arg(long, value_name = "FILE")]
        manifest: PathBuf,

        /// Published book URL (default: publish_base_url from config)
        #[arg(long)]
        base_url: Option<String>,
    },
}

/// Options shared by `daily` and `weekly`
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Branch the report describes
    #[arg(long)]
    pub branch: String,

    /// Only count commits not reachable from this revision
    #[arg(long, value_name = "REF")]
    pub base: Option<String>,

    /// Repository path (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Generate narrative sections
    #[arg(long, conflicts_with = "no_narrative")]
    pub narrative: bool,

    /// Skip narrative sections even if enabled in config
    #[arg(long)]
    pub no_narrative: bool,

    #[arg(long, value_name = "FILE")]
    pub build_log: Option<PathBuf>,

    /// Packaging (cook) log
    #[arg(long, value_name = "FILE")]
    pub cook_log: Option<PathBuf>,

    /// JUnit XML test report
    #[arg(long, value_name = "FILE")]
    pub test_xml: Option<PathBuf>,

    /// Static-analysis JSON report
    #[arg(long, value_name = "FILE")]
    pub static_report: Option<PathBuf>,

    /// Meeting note to link (daily default: the previous day)
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub meeting_date: Option<NaiveDate>,
}

impl RunArgs {
    /// Command-line choice, else the configured default
    pub fn narrative_enabled(&self, configured: bool) -> bool {
        if self.no_narrative {
            false
        } else {
            self.narrative || configured
        }
    }

    pub fn report_paths(&self) -> ReportPaths {
        ReportPaths {
            build_log: self.build_log.clone(),
            packaging_log: self.cook_log.clone(),
            test_results: self.test_xml.clone(),
            static_analysis: self.static_report.clone(),
        }
    }
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Update { date, range, .. } = &self.command {
            if date.is_none() && range.is_none() {
                return Err("update requires either --date or --range".to_string());
            }
        }

        if let Commands::Daily { run, .. } | Commands::Weekly { run, .. } = &self.command {
            if run.branch.trim().is_empty() {
                return Err("--branch must not be empty".to_string());
            }
        }

        Ok(())
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got '{}'", value))
}

fn parse_daily_key(value: &str) -> Result<ReportKey, String> {
    ReportKey::parse_date(value).map_err(|e| e.to_string())
}

fn parse_weekly_key(value: &str) -> Result<ReportKey, String> {
    ReportKey::parse_week(value).map_err(|e| e.to_string())
}
