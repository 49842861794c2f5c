use crate::ai::Synthesizer;
use crate::config::Config;
use crate::docs::pr_body;
use crate::docs::scanner::Scanner;
use crate::docs::toc;
use crate::document::{render, ReportDocument};
use crate::error::{DevLogError, Result};
use crate::git::stats::aggregate;
use crate::git::top_changes::select;
use crate::git::{CommitRecord, CommitSource, Window};
use crate::meeting::{self, MeetingNote};
use crate::metrics::{merge, resolve_metrics_file, MetricsDocument, Period, RunContext};
use crate::notify::{self, WebhookClient, WebhookPayload};
use crate::period::{offset_hours, ReportKey, ReportMode};
use crate::reports::{ExternalSummaries, ReportPaths};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PERIOD_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Inputs of a `daily` or `weekly` run
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub key: ReportKey,
    pub branch: String,
    pub base_branch: Option<String>,
    pub reports: ReportPaths,
    /// Meeting note to link; daily runs fall back to the previous day
    pub meeting_date: Option<NaiveDate>,
    pub narrative: bool,
}

/// Inputs of an `update` run, which republishes from the stored snapshot
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub key: ReportKey,
    pub meeting_date: Option<NaiveDate>,
    pub narrative: bool,
}

/// Where a run left its artifacts
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub metrics_path: PathBuf,
    pub report_path: PathBuf,
    pub metrics: MetricsDocument,
}

/// Current time in the configured offset
pub fn local_now(config: &Config) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&offset_hours(config.utc_offset_hours))
}

/// Runs the aggregation pipeline and publishes its two artifacts
pub struct Pipeline<S> {
    config: Config,
    source: S,
    synthesizer: Synthesizer,
}

impl<S: CommitSource> Pipeline<S> {
    pub fn new(config: Config, source: S, synthesizer: Synthesizer) -> Self {
        Self {
            config,
            source,
            synthesizer,
        }
    }

    /// Extract, aggregate, merge and persist the snapshot for one key, then
    /// publish the Markdown report from it.
    pub async fn run_report(
        &self,
        request: &ReportRequest,
        generated_at: DateTime<FixedOffset>,
    ) -> Result<RunOutcome> {
        let docs_root = &self.config.docs_root;
        let (since, until) = request.key.window(offset_hours(self.config.utc_offset_hours));

        let mut window = Window::new(since, Some(until));
        if let Some(ref base) = request.base_branch {
            window = window.excluding(base.clone());
        }

        let commits = self.source.commits(&window);
        info!("{}: {} commit(s) in window", request.key, commits.len());

        let stats = aggregate(&commits, self.config.hotspot_limit);
        let top_changes = select(&commits, self.config.top_change_limit);
        let summaries = ExternalSummaries::collect(&request.reports);

        let metrics_path = request.key.metrics_path(docs_root);
        let prior = MetricsDocument::load_prior(&metrics_path)
            .or_else(|| MetricsDocument::load_prior(&request.key.legacy_metrics_path(docs_root)));

        let run = RunContext {
            key: request.key.clone(),
            generated_at,
            period: Period {
                since: since.format(PERIOD_FORMAT).to_string(),
                until: until.format(PERIOD_FORMAT).to_string(),
            },
            branch: request.branch.clone(),
            base_branch: request.base_branch.clone(),
        };

        let metrics = merge(prior.as_ref(), &stats, &top_changes, &summaries, &run);
        metrics.save(&metrics_path)?;
        info!("Metrics written to {}", metrics_path.display());

        let meeting_date = request
            .meeting_date
            .or_else(|| request.key.default_meeting_date());

        let report_path = self
            .publish(&metrics, &commits, meeting_date, request.narrative, &generated_at)
            .await?;

        Ok(RunOutcome {
            metrics_path,
            report_path,
            metrics,
        })
    }

    /// Republish the report from the persisted snapshot without reading commits
    pub async fn update(
        &self,
        request: &UpdateRequest,
        now: DateTime<FixedOffset>,
    ) -> Result<RunOutcome> {
        let docs_root = &self.config.docs_root;
        let metrics_path = resolve_metrics_file(
            &request.key.metrics_path(docs_root),
            &[request.key.legacy_metrics_path(docs_root)],
        )?;
        let metrics = MetricsDocument::load_for(&metrics_path, &request.key)?;

        let meeting_date = request
            .meeting_date
            .or_else(|| request.key.default_meeting_date());

        let report_path = self
            .publish(&metrics, &[], meeting_date, request.narrative, &now)
            .await?;

        Ok(RunOutcome {
            metrics_path,
            report_path,
            metrics,
        })
    }

    /// Pull-request body for the commits in `base..HEAD`
    pub fn pr_body(&self, base: &str) -> String {
        let commits = self.source.commits(&Window::unbounded().excluding(base));
        debug!("{} commit(s) ahead of {}", commits.len(), base);
        let top_changes = select(&commits, self.config.top_change_limit);
        pr_body::build_body(&commits, &top_changes)
    }

    async fn publish(
        &self,
        metrics: &MetricsDocument,
        commits: &[CommitRecord],
        meeting_date: Option<NaiveDate>,
        narrative: bool,
        generated_at: &DateTime<FixedOffset>,
    ) -> Result<PathBuf> {
        let docs_root = &self.config.docs_root;
        let key = ReportKey::parse(&metrics.key)?;
        let report_path = key.report_path(docs_root);

        let meeting = meeting_date.and_then(|date| {
            let path = meeting::resolve(docs_root, date)?;
            match MeetingNote::load(&path) {
                Ok(note) => Some((date, note)),
                Err(e) => {
                    warn!("Could not read meeting note {}: {}", path.display(), e);
                    None
                }
            }
        });

        let mut meeting_linkage = None;
        if let Some((date, ref note)) = meeting {
            let mut body = meeting_summary(docs_root, &report_path, note);
            if narrative {
                let meeting_key = date.format("%Y-%m-%d").to_string();
                let commentary = self
                    .synthesizer
                    .meeting_linkage(&meeting_key, note, metrics)
                    .await;
                body.push('\n');
                body.push_str(&commentary);
            }
            meeting_linkage = Some(body);
        }

        let (summary, growth_feedback) = if narrative {
            (
                Some(self.synthesizer.period_summary(metrics).await),
                Some(self.synthesizer.growth_feedback(metrics, commits).await),
            )
        } else {
            (None, None)
        };

        let mut document =
            ReportDocument::load_or_init(&report_path, &render::title(metrics.mode, &metrics.key))?;

        document.update_section(render::TOP_CHANGES, &render::top_changes(&metrics.top_changes));
        document.update_section(render::SYSTEM_IMPACT, &render::system_impact(metrics));
        if let Some(ref body) = meeting_linkage {
            document.update_section(render::MEETING_LINKAGE, body);
        }
        document.update_section(render::OVERVIEW_DIAGRAM, &render::overview_diagram(metrics));
        if let Some(ref body) = summary {
            document.update_section(render::SUMMARY, body);
        }
        if let Some(ref body) = growth_feedback {
            document.update_section(render::GROWTH_FEEDBACK, body);
        }
        document.update_section(render::GENERATED_AT, &render::generated_at(generated_at));

        document.save()?;
        info!("Report written to {}", report_path.display());
        Ok(report_path)
    }
}

/// Link to the note plus its keywords and open action items
fn meeting_summary(docs_root: &Path, report_path: &Path, note: &MeetingNote) -> String {
    let mut output = format!(
        "- Meeting: [{}]({})\n",
        note.title,
        relative_link(docs_root, report_path, &note.path)
    );

    if let Some(ref keywords) = note.keywords {
        output.push_str(&format!("- Keywords: {}\n", keywords));
    }

    if note.actions.is_empty() {
        output.push_str("- Action items: none\n");
    } else {
        output.push_str("- Action items:\n");
        for action in &note.actions {
            output.push_str(&format!("  - [ ] {}\n", action));
        }
    }

    output
}

/// Path of `target` as seen from the directory holding `from`
fn relative_link(docs_root: &Path, from: &Path, target: &Path) -> String {
    let (Ok(from), Ok(target)) = (from.strip_prefix(docs_root), target.strip_prefix(docs_root))
    else {
        return target.display().to_string();
    };

    let depth = from.components().count().saturating_sub(1);
    let mut link = "../".repeat(depth);
    let parts: Vec<String> = target
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    link.push_str(&parts.join("/"));
    link
}

fn webhook_client(config: &Config) -> Result<Option<WebhookClient>> {
    match config.webhook_url {
        Some(ref url) if !url.trim().is_empty() => Ok(Some(WebhookClient::new(url.clone())?)),
        _ => {
            warn!("No webhook URL configured, skipping notification");
            Ok(None)
        }
    }
}

/// Announce a report from its persisted snapshot.
///
/// Returns `false` when no webhook is configured.
pub async fn notify_report(
    config: &Config,
    key: &ReportKey,
    url: Option<String>,
    now: DateTime<FixedOffset>,
) -> Result<bool> {
    let Some(client) = webhook_client(config)? else {
        return Ok(false);
    };

    let docs_root = &config.docs_root;
    let metrics_path =
        resolve_metrics_file(&key.metrics_path(docs_root), &[key.legacy_metrics_path(docs_root)])?;
    let metrics = MetricsDocument::load_for(&metrics_path, key)?;

    let url = match (url, config.publish_base_url.as_deref()) {
        (Some(url), _) => Some(url),
        (None, Some(base)) => {
            let page = format!("DevLog/{}/{}.md", key.mode().dir_name(), key);
            Some(notify::published_url(base, &page)?)
        }
        (None, None) => None,
    };

    let (username, embed) = match key.mode() {
        ReportMode::Daily => (notify::DAILY_USERNAME, notify::daily_embed(&metrics, url, &now)),
        ReportMode::Weekly => (notify::WEEKLY_USERNAME, notify::weekly_embed(&metrics, url, &now)),
    };

    client.send(&WebhookPayload::embed(username, embed)).await?;
    Ok(true)
}

/// Announce one meeting note
pub async fn notify_meeting(
    config: &Config,
    file: &Path,
    commit_message: Option<&str>,
    commit_url: Option<String>,
    now: DateTime<FixedOffset>,
) -> Result<bool> {
    let Some(client) = webhook_client(config)? else {
        return Ok(false);
    };

    let note = MeetingNote::load(file)?;
    let embed = notify::meeting_embed(&note, commit_message, commit_url, &now);
    client
        .send(&WebhookPayload::embed(notify::MEETING_USERNAME, embed))
        .await?;
    Ok(true)
}

/// One plain message per note listed in `manifest`; returns how many were sent
pub async fn notify_meetings(
    config: &Config,
    manifest: &Path,
    base_url: Option<&str>,
) -> Result<usize> {
    let files = notify::read_manifest(manifest)?;
    if files.is_empty() {
        info!("No meeting notes listed in {}", manifest.display());
        return Ok(0);
    }

    let base_url = base_url
        .or(config.publish_base_url.as_deref())
        .ok_or_else(|| DevLogError::MissingConfig("publish_base_url".to_string()))?;

    let Some(client) = webhook_client(config)? else {
        return Ok(0);
    };

    for file in &files {
        let message = notify::meeting_message(file, base_url)?;
        client.send(&WebhookPayload::message(message)).await?;
        debug!("Announced {}", file);
    }

    Ok(files.len())
}

/// Regenerate `SUMMARY.md` for the documentation tree at `docs_root`
pub fn write_summary(config: &Config, docs_root: &Path, out: Option<&Path>) -> Result<PathBuf> {
    let scanner = Scanner::new(config.exclude_patterns.clone(), None);
    let documents: Vec<String> = scanner
        .scan(docs_root)?
        .into_iter()
        .filter(|d| d != "SUMMARY.md")
        .collect();

    let out = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| docs_root.join("SUMMARY.md"));
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, toc::build_summary(&documents))?;

    info!("Indexed {} document(s) into {}", documents.len(), out.display());
    Ok(out)
}
