// Folds extracted commits into the cumulative statistics of one window.

use crate::git::{ChangeType, CommitRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Default number of hotspot files kept
pub const DEFAULT_HOTSPOT_LIMIT: usize = 5;

/// A file ranked by total churn across the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredHotspot")]
pub struct HotspotFile {
    pub path: String,
    /// Added + deleted lines, summed over every commit touching the file
    pub churn: u64,
}

/// Older snapshots list hotspots as bare paths
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHotspot {
    Path(String),
    Ranked {
        path: String,
        #[serde(default)]
        churn: u64,
    },
}

impl From<StoredHotspot> for HotspotFile {
    fn from(stored: StoredHotspot) -> Self {
        match stored {
            StoredHotspot::Path(path) => Self { path, churn: 0 },
            StoredHotspot::Ranked { path, churn } => Self { path, churn },
        }
    }
}

/// Aggregated statistics for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Total number of commits
    pub commit_count: u32,
    /// Total lines added
    pub additions: u64,
    /// Total lines deleted
    pub deletions: u64,
    /// Distinct files touched
    pub files_changed: u32,
    /// Distinct calendar days with at least one commit
    pub active_days: u32,
    /// Distinct author names, sorted
    pub authors: Vec<String>,
    /// Count per change type; every type is present
    pub commit_types: BTreeMap<ChangeType, u32>,
    /// Files with the most churn, descending
    pub hotspot_files: Vec<HotspotFile>,
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            commit_count: 0,
            additions: 0,
            deletions: 0,
            files_changed: 0,
            active_days: 0,
            authors: Vec::new(),
            commit_types: zeroed_type_counts(),
            hotspot_files: Vec::new(),
        }
    }
}

impl StatsSnapshot {
    /// Get net lines changed (additions - deletions)
    pub fn net_lines(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }
}

/// Map holding a zero for every change type
pub fn zeroed_type_counts() -> BTreeMap<ChangeType, u32> {
    ChangeType::ALL.iter().map(|t| (*t, 0)).collect()
}

/// Aggregate commits into a snapshot, keeping the top `hotspot_limit` files
pub fn aggregate(commits: &[CommitRecord], hotspot_limit: usize) -> StatsSnapshot {
    let mut stats = StatsSnapshot::default();
    let mut authors = BTreeSet::new();
    let mut days = HashSet::new();

    // Churn per file in first-seen order, so ties keep that order after a stable sort
    let mut churn: Vec<HotspotFile> = Vec::new();
    let mut churn_index: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        stats.commit_count += 1;
        authors.insert(commit.author.clone());
        days.insert(commit.timestamp.date_naive());
        *stats.commit_types.entry(commit.change_type).or_insert(0) += 1;

        for (path, delta) in &commit.files {
            stats.additions += delta.added;
            stats.deletions += delta.deleted;

            match churn_index.get(path.as_str()) {
                Some(&idx) => churn[idx].churn += delta.churn(),
                None => {
                    churn_index.insert(path.as_str(), churn.len());
                    churn.push(HotspotFile {
                        path: path.clone(),
                        churn: delta.churn(),
                    });
                }
            }
        }
    }

    stats.files_changed = churn.len() as u32;
    stats.active_days = days.len() as u32;
    stats.authors = authors.into_iter().collect();

    churn.sort_by(|a, b| b.churn.cmp(&a.churn));
    churn.truncate(hotspot_limit);
    stats.hotspot_files = churn;

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::{at, commit, commit_at};

    #[test]
    fn test_empty_input_is_zero_activity() {
        let stats = aggregate(&[], DEFAULT_HOTSPOT_LIMIT);

        assert_eq!(stats.commit_count, 0);
        assert_eq!(stats.additions, 0);
        assert_eq!(stats.deletions, 0);
        assert_eq!(stats.files_changed, 0);
        assert_eq!(stats.active_days, 0);
        assert!(stats.authors.is_empty());
        assert!(stats.hotspot_files.is_empty());

        // Every type indexable without existence checks
        assert_eq!(stats.commit_types.len(), ChangeType::ALL.len());
        for change_type in ChangeType::ALL {
            assert_eq!(stats.commit_types[&change_type], 0);
        }
        assert_eq!(stats, StatsSnapshot::default());
    }

    #[test]
    fn test_scenario_three_commits() {
        let commits = vec![
            commit("feat: add login (#42)", "A", &[("login.rs", 40, 0)]),
            commit("fix: null pointer", "B", &[("login.rs", 2, 1)]),
            commit("chore: bump deps", "A", &[("Cargo.toml", 1, 1)]),
        ];

        let stats = aggregate(&commits, DEFAULT_HOTSPOT_LIMIT);
        assert_eq!(stats.commit_count, 3);
        assert_eq!(stats.authors, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(stats.commit_types[&ChangeType::Feature], 1);
        assert_eq!(stats.commit_types[&ChangeType::Fix], 1);
        assert_eq!(stats.commit_types[&ChangeType::Chore], 1);
        assert_eq!(stats.commit_types[&ChangeType::Docs], 0);
        assert_eq!(stats.additions, 43);
        assert_eq!(stats.deletions, 2);
        assert_eq!(stats.net_lines(), 41);
        assert_eq!(stats.files_changed, 2);
    }

    #[test]
    fn test_hotspot_ranking_sums_churn_across_commits() {
        let commits = vec![
            commit("feat: a", "X", &[("A", 6, 4), ("B", 20, 10)]),
            commit("fix: b", "X", &[("B", 3, 2), ("C", 5, 0)]),
        ];

        let stats = aggregate(&commits, DEFAULT_HOTSPOT_LIMIT);
        let ranked: Vec<(&str, u64)> = stats
            .hotspot_files
            .iter()
            .map(|h| (h.path.as_str(), h.churn))
            .collect();
        assert_eq!(ranked, vec![("B", 35), ("A", 10), ("C", 5)]);
    }

    #[test]
    fn test_hotspot_ties_keep_first_seen_order() {
        let commits = vec![
            commit("feat: a", "X", &[("first.rs", 5, 5), ("second.rs", 10, 0)]),
            commit("fix: b", "X", &[("third.rs", 0, 10)]),
        ];

        let stats = aggregate(&commits, DEFAULT_HOTSPOT_LIMIT);
        let paths: Vec<&str> = stats.hotspot_files.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["first.rs", "second.rs", "third.rs"]);
    }

    #[test]
    fn test_hotspots_truncate_to_limit() {
        let files: Vec<(String, u64, u64)> =
            (0..8).map(|i| (format!("f{}.rs", i), i as u64, 0)).collect();
        let refs: Vec<(&str, u64, u64)> = files.iter().map(|(p, a, d)| (p.as_str(), *a, *d)).collect();
        let commits = vec![commit("feat: many", "X", &refs)];

        let stats = aggregate(&commits, DEFAULT_HOTSPOT_LIMIT);
        assert_eq!(stats.hotspot_files.len(), 5);
        assert_eq!(stats.hotspot_files[0].path, "f7.rs");
        assert_eq!(stats.files_changed, 8);
    }

    #[test]
    fn test_active_days() {
        let commits = vec![
            commit_at("feat: a", "X", &[], at(10, 9)),
            commit_at("feat: b", "X", &[], at(10, 18)),
            commit_at("feat: c", "X", &[], at(12, 9)),
        ];
        assert_eq!(aggregate(&commits, 5).active_days, 2);
    }

    #[test]
    fn test_commit_types_serialize_with_every_tag() {
        let stats = aggregate(&[commit("feat: x", "A", &[])], 5);
        let json = serde_json::to_value(&stats.commit_types).unwrap();
        assert_eq!(json["feat"], 1);
        assert_eq!(json["other"], 0);
        assert_eq!(json.as_object().unwrap().len(), 9);
    }
}
