//! The persisted metrics snapshot for one identity key, and the merge that
//! produces it from this run's statistics plus the previous snapshot.

use crate::error::{DevLogError, Result};
use crate::git::stats::{zeroed_type_counts, HotspotFile, StatsSnapshot};
use crate::git::top_changes::TopChange;
use crate::git::ChangeType;
use crate::period::{ReportKey, ReportMode};
use crate::reports::{
    BuildSummary, ExternalSummaries, PackagingSummary, StaticAnalysisSummary, TestSummary,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Time range a snapshot was computed over, as displayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub since: String,
    pub until: String,
}

/// Fields curated outside this tool. A run never recomputes them; they are
/// carried forward from the previous snapshot for the same key.
///
/// Hand-edited files often hold `null` for an empty list or count, so
/// those read as the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratedFields {
    pub release_tag: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub risk_items: Vec<String>,
    pub mitigation: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub next_items: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub pending_items: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub refactor_items: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub notable_api_list: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub api_added: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub api_changed: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub api_removed: u32,
    pub load_time_prev: Option<f64>,
    pub load_time_now: Option<f64>,
    pub delta_pct: Option<f64>,
    pub crash_prev: Option<u32>,
    pub crash_now: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub build_fail_count: u32,
    pub rtt_ms: Option<f64>,
    pub net_fail_pct: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Canonical metrics record for one date or ISO week.
///
/// Every run-owned field has a default so snapshots written by older
/// generators (`date`, `ubt`, `cook`, bare hotspot paths) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDocument {
    /// Identity key (`YYYY-MM-DD` or `YYYY-Www`)
    #[serde(default, alias = "date")]
    pub key: String,
    #[serde(default)]
    pub mode: ReportMode,
    #[serde(default)]
    pub generated_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub base_branch: Option<String>,

    #[serde(default)]
    pub commit_count: u32,
    #[serde(default)]
    pub author_count: u32,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default = "zeroed_type_counts")]
    pub commit_types: BTreeMap<ChangeType, u32>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub net_lines: i64,
    #[serde(default)]
    pub files_changed: u32,
    #[serde(default)]
    pub active_days: u32,
    #[serde(default)]
    pub hotspot_files: Vec<HotspotFile>,
    #[serde(default)]
    pub top_changes: Vec<TopChange>,

    #[serde(default, alias = "ubt")]
    pub build: BuildSummary,
    #[serde(default, alias = "cook")]
    pub packaging: PackagingSummary,
    #[serde(default)]
    pub tests: TestSummary,
    #[serde(default)]
    pub static_analysis: StaticAnalysisSummary,

    #[serde(flatten)]
    pub curated: CuratedFields,
}

/// Everything a run contributes to the merged document
#[derive(Debug, Clone)]
pub struct RunContext {
    pub key: ReportKey,
    pub generated_at: DateTime<FixedOffset>,
    pub period: Period,
    pub branch: String,
    pub base_branch: Option<String>,
}

/// Merge this run's results over the previous snapshot.
///
/// Run-owned fields always come from this run; curated fields come from
/// `prior` when present and default otherwise.
pub fn merge(
    prior: Option<&CuratedFields>,
    stats: &StatsSnapshot,
    top_changes: &[TopChange],
    summaries: &ExternalSummaries,
    run: &RunContext,
) -> MetricsDocument {
    let curated = prior.cloned().unwrap_or_default();

    // Keep every tag present even if `stats` was built by hand
    let mut commit_types = zeroed_type_counts();
    commit_types.extend(stats.commit_types.iter().map(|(k, v)| (*k, *v)));

    MetricsDocument {
        key: run.key.to_string(),
        mode: run.key.mode(),
        generated_at: Some(run.generated_at),
        period: run.period.clone(),
        branch: run.branch.clone(),
        base_branch: run.base_branch.clone(),
        commit_count: stats.commit_count,
        author_count: stats.authors.len() as u32,
        authors: stats.authors.clone(),
        commit_types,
        additions: stats.additions,
        deletions: stats.deletions,
        net_lines: stats.net_lines(),
        files_changed: stats.files_changed,
        active_days: stats.active_days,
        hotspot_files: stats.hotspot_files.clone(),
        top_changes: top_changes.to_vec(),
        build: summaries.build.clone(),
        packaging: summaries.packaging.clone(),
        tests: summaries.tests.clone(),
        static_analysis: summaries.static_analysis.clone(),
        curated,
    }
}

impl MetricsDocument {
    pub fn count_of(&self, change_type: ChangeType) -> u32 {
        self.commit_types.get(&change_type).copied().unwrap_or(0)
    }

    /// Load a snapshot, failing on missing or corrupt files
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load the snapshot stored for `key`, taking identity from the key so
    /// files written without `key` or `mode` still publish under it
    pub fn load_for(path: &Path, key: &ReportKey) -> Result<Self> {
        let mut doc = Self::load(path)?;
        doc.key = key.to_string();
        doc.mode = key.mode();
        Ok(doc)
    }

    /// Curated fields of the previous snapshot, for carry-forward.
    ///
    /// Only the curated keys are read, so a prior holding nothing else still
    /// counts. Missing or corrupt files yield `None`.
    pub fn load_prior(path: &Path) -> Option<CuratedFields> {
        if !path.exists() {
            return None;
        }

        match read_curated(path) {
            Ok(curated) => Some(curated),
            Err(e) => {
                warn!("Ignoring unreadable prior metrics at {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write as indented UTF-8 JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        fs::write(path, json)?;
        Ok(())
    }
}

fn read_curated(path: &Path) -> Result<CuratedFields> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Locate the snapshot for a key, syncing a legacy copy into the primary
/// location if that is the only one present.
pub fn resolve_metrics_file(primary: &Path, fallbacks: &[PathBuf]) -> Result<PathBuf> {
    if primary.exists() {
        return Ok(primary.to_path_buf());
    }

    for candidate in fallbacks {
        if candidate.exists() {
            if let Some(parent) = primary.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(candidate, primary)?;
            info!(
                "Synced metrics from fallback: {} -> {}",
                candidate.display(),
                primary.display()
            );
            return Ok(primary.to_path_buf());
        }
    }

    Err(DevLogError::MetricsNotFound {
        primary: primary.to_path_buf(),
        checked: fallbacks.to_vec(),
    })
}
