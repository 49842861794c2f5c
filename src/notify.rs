//! Chat webhook notifications for published reports and meeting notes.

use crate::error::{DevLogError, Result};
use crate::git::ChangeType;
use crate::meeting::MeetingNote;
use crate::metrics::MetricsDocument;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, Url};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const DAILY_COLOR: u32 = 0x5865F2;
const WEEKLY_COLOR: u32 = 0xFEE75C;
const MEETING_COLOR: u32 = 0x9B59B6;

pub const DAILY_USERNAME: &str = "DevLog Bot 📅";
pub const WEEKLY_USERNAME: &str = "Weekly Report Bot 📊";
pub const MEETING_USERNAME: &str = "Meeting Notes ✍️";

/// Top changes shown in a daily embed
const EMBED_TOP_CHANGES: usize = 3;

/// Body of one webhook POST
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

impl WebhookPayload {
    pub fn embed(username: &str, embed: Embed) -> Self {
        Self {
            username: Some(username.to_string()),
            content: None,
            embeds: vec![embed],
        }
    }

    pub fn message(content: String) -> Self {
        Self {
            username: None,
            content: Some(content),
            embeds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer: EmbedFooter,
    /// RFC 3339
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn block(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

/// Emoji shown next to a change of this type
pub fn emoji_for(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Feature => "✨",
        ChangeType::Fix => "🐛",
        ChangeType::Refactor => "♻️",
        ChangeType::Performance => "⚡",
        ChangeType::Docs => "📝",
        ChangeType::Test => "✅",
        ChangeType::Chore => "🔧",
        _ => "📌",
    }
}

pub fn daily_embed(metrics: &MetricsDocument, url: Option<String>, now: &DateTime<FixedOffset>) -> Embed {
    let mut changes = String::new();
    for change in metrics.top_changes.iter().take(EMBED_TOP_CHANGES) {
        changes.push_str(&format!(
            "{} **{}**: {}\n",
            emoji_for(change.change_type),
            change.change_type,
            change.summary
        ));
    }
    if changes.is_empty() {
        changes.push_str("No changes");
    }

    let stats = format!(
        "📊 Commits: {}\n➕ Added: {} lines\n➖ Deleted: {} lines",
        metrics.commit_count, metrics.additions, metrics.deletions
    );

    Embed {
        title: format!("📅 Daily DevLog — {}", metrics.key),
        description: "Today's development activity has been recorded.".to_string(),
        color: DAILY_COLOR,
        url,
        fields: vec![
            EmbedField::block("🎯 Key changes", changes.trim_end().to_string()),
            EmbedField::block("📈 Stats", stats),
        ],
        footer: EmbedFooter {
            text: "💡 Check the DevLog and leave your feedback!".to_string(),
        },
        timestamp: now.to_rfc3339(),
    }
}

pub fn weekly_embed(metrics: &MetricsDocument, url: Option<String>, now: &DateTime<FixedOffset>) -> Embed {
    let description = if metrics.commit_count == 0 {
        "No activity this week.".to_string()
    } else {
        format!(
            "{} commits by {} author(s), net {:+} lines.",
            metrics.commit_count, metrics.author_count, metrics.net_lines
        )
    };

    let stats = format!(
        "📊 Total commits: {}\n📅 Active days: {}/7\n✨ Features: {}\n🐛 Fixes: {}",
        metrics.commit_count,
        metrics.active_days,
        metrics.count_of(ChangeType::Feature),
        metrics.count_of(ChangeType::Fix)
    );

    Embed {
        title: format!("📊 Weekly Report — {}", metrics.key),
        description,
        color: WEEKLY_COLOR,
        url,
        fields: vec![
            EmbedField::block("📈 Weekly stats", stats),
            EmbedField::block(
                "💭 Retrospective",
                "Answer the retrospective questions in the Weekly Report \
                 and plan next week together! 🚀"
                    .to_string(),
            ),
        ],
        footer: EmbedFooter {
            text: "✍️ Write your answers and grow together!".to_string(),
        },
        timestamp: now.to_rfc3339(),
    }
}

pub fn meeting_embed(
    note: &MeetingNote,
    commit_message: Option<&str>,
    commit_url: Option<String>,
    now: &DateTime<FixedOffset>,
) -> Embed {
    let message = commit_message
        .and_then(|m| m.lines().next())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("N/A");

    Embed {
        title: format!("📚 {}", note.title),
        description: format!("**{}**", note.summary),
        color: MEETING_COLOR,
        url: commit_url.filter(|u| !u.is_empty()),
        fields: vec![EmbedField::block("📝 Commit Message", message.to_string())],
        footer: EmbedFooter {
            text: "Follow the link for details.".to_string(),
        },
        timestamp: now.to_rfc3339(),
    }
}

/// Published page for a Markdown document below `base_url`.
///
/// `Documents/Meeting/a b.md` becomes `<base_url>/Meeting/a%20b.html`.
pub fn published_url(base_url: &str, markdown_path: &str) -> Result<String> {
    let relative = markdown_path
        .trim_start_matches("./")
        .strip_prefix("Documents/")
        .unwrap_or(markdown_path);
    let relative = match relative.strip_suffix(".md") {
        Some(stem) => format!("{}.html", stem),
        None => relative.to_string(),
    };

    let mut url = Url::parse(base_url)
        .map_err(|e| DevLogError::config(format!("invalid publish base URL '{}': {}", base_url, e)))?;
    url.path_segments_mut()
        .map_err(|_| DevLogError::config(format!("publish base URL '{}' cannot hold a path", base_url)))?
        .pop_if_empty()
        .extend(relative.split('/').filter(|s| !s.is_empty()));

    Ok(url.to_string())
}

/// Plain message announcing one updated meeting note
pub fn meeting_message(markdown_path: &str, base_url: &str) -> Result<String> {
    let title = markdown_path.rsplit('/').next().unwrap_or(markdown_path);
    let url = published_url(base_url, markdown_path)?;
    Ok(format!("📘 Meeting note **{}** was updated!\n🔗 {}", title, url))
}

/// Newline-delimited list of meeting note paths; a missing manifest is empty
pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        debug!("No manifest at {}", path.display());
        return Ok(Vec::new());
    }

    let mut files: Vec<String> = Vec::new();
    for line in fs::read_to_string(path)?.lines() {
        let line = line.trim();
        if !line.is_empty() && !files.iter().any(|f| f == line) {
            files.push(line.to_string());
        }
    }
    Ok(files)
}

/// Sends payloads to one webhook URL
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, url })
    }

    /// POST the payload; any non-2xx status is an error
    pub async fn send(&self, payload: &WebhookPayload) -> Result<()> {
        let response = self.client.post(&self.url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DevLogError::webhook(format!("status {}: {}", status, body.trim())));
        }

        info!("Webhook delivered");
        Ok(())
    }
}
