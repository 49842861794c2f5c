//! Meeting notes linked from daily reports.

use crate::error::Result;
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

const DEFAULT_SUMMARY: &str = "See the document for details.";

/// What a report needs from one meeting note
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingNote {
    pub path: PathBuf,
    /// First `### ` header, or the file stem
    pub title: String,
    /// First line after `**Summary:**`
    pub summary: String,
    /// Comma-separated keywords, as written
    pub keywords: Option<String>,
    /// Unchecked `- [ ]` items
    pub actions: Vec<String>,
}

impl MeetingNote {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(path, &text))
    }

    pub fn parse(path: &Path, text: &str) -> Self {
        let title = first_capture(&TITLE, r"(?m)^###\s*(.+?)\s*$", text).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let summary = first_capture(
            &SUMMARY,
            r"(?m)^\*\*(?:Summary|정리 요약):\*\*\s*\r?\n\s*(.+?)\s*$",
            text,
        )
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

        let keywords = first_capture(&KEYWORDS, r"(?m)^- (?:Keywords|키워드):\s*(.+?)\s*$", text);

        let actions = regex(&ACTIONS, r"(?m)^\s*- \[ \] (.+?)\s*$")
            .map(|re| {
                re.captures_iter(text)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            title,
            summary,
            keywords,
            actions,
        }
    }
}

static TITLE: OnceLock<Option<Regex>> = OnceLock::new();
static SUMMARY: OnceLock<Option<Regex>> = OnceLock::new();
static KEYWORDS: OnceLock<Option<Regex>> = OnceLock::new();
static ACTIONS: OnceLock<Option<Regex>> = OnceLock::new();

fn regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn first_capture(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> Option<String> {
    regex(cell, pattern)?
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// Find the note for `date` under `<docs_root>/Meeting`.
///
/// Tries `Meeting/<YYYY-MM-DD>.md`, then the older `Meeting_<yymmdd>_*.md`
/// naming in `Meeting/` and `Meeting/Daily/`.
pub fn resolve(docs_root: &Path, date: NaiveDate) -> Option<PathBuf> {
    let meeting_dir = docs_root.join("Meeting");

    let canonical = meeting_dir.join(format!("{}.md", date.format("%Y-%m-%d")));
    if canonical.exists() {
        return Some(canonical);
    }

    let prefix = format!("Meeting_{}", date.format("%y%m%d"));
    for dir in [meeting_dir.clone(), meeting_dir.join("Daily")] {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        let mut matches: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| is_legacy_name(n, &prefix))
            })
            .collect();
        matches.sort();

        if let Some(first) = matches.into_iter().next() {
            return Some(first);
        }
    }

    debug!("No meeting note for {} under {}", date, meeting_dir.display());
    None
}

/// `Meeting_<yymmdd>_<anything>.md`
fn is_legacy_name(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|rest| rest.ends_with(".md"))
}
