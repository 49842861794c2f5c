pub mod classify;
pub mod parser;
pub mod stats;
pub mod top_changes;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of change-type tags a commit subject is classified into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    #[serde(rename = "feat")]
    Feature,
    #[serde(rename = "fix")]
    Fix,
    #[serde(rename = "docs")]
    Docs,
    #[serde(rename = "style")]
    Style,
    #[serde(rename = "refactor")]
    Refactor,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "chore")]
    Chore,
    #[serde(rename = "perf")]
    Performance,
    #[serde(rename = "other")]
    Other,
}

impl ChangeType {
    /// Every tag, in declaration order
    pub const ALL: [ChangeType; 9] = [
        Self::Feature,
        Self::Fix,
        Self::Docs,
        Self::Style,
        Self::Refactor,
        Self::Test,
        Self::Chore,
        Self::Performance,
        Self::Other,
    ];

    /// Short tag as it appears in commit subjects and metrics files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feat",
            Self::Fix => "fix",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Refactor => "refactor",
            Self::Test => "test",
            Self::Chore => "chore",
            Self::Performance => "perf",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lines added and deleted in one file by one commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineDelta {
    pub added: u64,
    pub deleted: u64,
}

impl LineDelta {
    pub fn new(added: u64, deleted: u64) -> Self {
        Self { added, deleted }
    }

    /// Total churn (added + deleted)
    pub fn churn(&self) -> u64 {
        self.added + self.deleted
    }
}

/// One commit as extracted from history
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// Full commit hash
    pub hash: String,
    /// Short commit hash (7 characters)
    pub short_hash: String,
    /// First line of the commit message
    pub subject: String,
    /// Author display name
    pub author: String,
    /// Author timestamp in the author's own offset
    pub timestamp: DateTime<FixedOffset>,
    /// Tag derived from the subject
    pub change_type: ChangeType,
    /// Per-file line deltas, in diff order
    pub files: Vec<(String, LineDelta)>,
}

impl CommitRecord {
    /// Build a record, classifying the subject
    pub fn new(
        hash: String,
        subject: String,
        author: String,
        timestamp: DateTime<FixedOffset>,
        files: Vec<(String, LineDelta)>,
    ) -> Self {
        let short_hash = format!("{:.7}", hash);
        let change_type = classify::classify(&subject);
        Self {
            hash,
            short_hash,
            subject,
            author,
            timestamp,
            change_type,
            files,
        }
    }

    pub fn added(&self) -> u64 {
        self.files.iter().map(|(_, d)| d.added).sum()
    }

    pub fn deleted(&self) -> u64 {
        self.files.iter().map(|(_, d)| d.deleted).sum()
    }
}

/// Time window (and optional exclusivity bound) to extract commits for
#[derive(Debug, Clone)]
pub struct Window {
    /// Start (inclusive)
    pub since: DateTime<FixedOffset>,
    /// End (inclusive); `None` means up to now
    pub until: Option<DateTime<FixedOffset>>,
    /// Revision whose ancestors are excluded, for `base..HEAD` ranges
    pub exclude: Option<String>,
}

impl Window {
    pub fn new(since: DateTime<FixedOffset>, until: Option<DateTime<FixedOffset>>) -> Self {
        Self {
            since,
            until,
            exclude: None,
        }
    }

    /// Every commit, however old
    pub fn unbounded() -> Self {
        Self::new(DateTime::<Utc>::MIN_UTC.into(), None)
    }

    /// Exclude everything reachable from `base`
    pub fn excluding(mut self, base: impl Into<String>) -> Self {
        self.exclude = Some(base.into());
        self
    }

    /// Check if a timestamp falls within this window
    pub fn contains(&self, at: &DateTime<FixedOffset>) -> bool {
        at >= &self.since && self.until.map_or(true, |until| at <= &until)
    }
}

/// Anything that can list commits for a window.
///
/// Implementations never fail: an unavailable source yields no commits.
pub trait CommitSource {
    fn commits(&self, window: &Window) -> Vec<CommitRecord>;
}

/// Fixed list of commits, filtered by timestamp only
impl CommitSource for Vec<CommitRecord> {
    fn commits(&self, window: &Window) -> Vec<CommitRecord> {
        self.iter()
            .filter(|c| window.contains(&c.timestamp))
            .cloned()
            .collect()
    }
}
