use crate::error::Result;
use crate::git::{CommitRecord, CommitSource, LineDelta, Window};
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use git2::Repository as Git2Repository;
use std::path::PathBuf;
use tracing::{debug, trace, warn};

/// Extracts commits from a local git repository
pub struct Parser {
    /// Repository working directory (or any path inside it)
    repo_path: PathBuf,
}

impl Parser {
    /// Create a new parser for the repository at `repo_path`
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    /// Parse commits in the window, newest first (log order)
    pub fn parse_commits(&self, window: &Window) -> Result<Vec<CommitRecord>> {
        let repo = Git2Repository::discover(&self.repo_path)?;
        let mut revwalk = repo.revwalk()?;

        // Start from HEAD
        revwalk.push_head()?;

        // Same ordering as `git log`: children before parents, newest first
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        if let Some(ref base) = window.exclude {
            let base_commit = repo.revparse_single(base)?.peel_to_commit()?;
            revwalk.hide(base_commit.id())?;
        }

        let mut commits = Vec::new();

        for oid in revwalk {
            let oid = oid?;
            let git_commit = repo.find_commit(oid)?;

            let timestamp = Self::convert_timestamp(&git_commit);

            // Filter by window
            if !window.contains(&timestamp) {
                continue;
            }

            let subject = git_commit
                .summary()
                .unwrap_or("")
                .trim()
                .to_string();
            let author = git_commit.author().name().unwrap_or("Unknown").to_string();
            let files = Self::get_file_deltas(&repo, &git_commit)?;

            let record = CommitRecord::new(oid.to_string(), subject, author, timestamp, files);
            trace!(
                "{} {} (+{} -{})",
                record.hash,
                record.subject,
                record.added(),
                record.deleted()
            );
            commits.push(record);
        }

        debug!(
            "Extracted {} commits from {}",
            commits.len(),
            self.repo_path.display()
        );
        Ok(commits)
    }

    /// Convert git2 Time to a timestamp in the commit's own offset
    fn convert_timestamp(commit: &git2::Commit) -> DateTime<FixedOffset> {
        let time = commit.time();
        let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
        offset
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(|| Utc::now().with_timezone(&offset))
    }

    /// Per-file added/deleted counts against the first parent.
    ///
    /// Binary files carry no line counts and are left out.
    fn get_file_deltas(
        repo: &Git2Repository,
        commit: &git2::Commit,
    ) -> Result<Vec<(String, LineDelta)>> {
        let tree = commit.tree()?;

        // Get parent commit tree (or empty tree for first commit)
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };

        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;

        let mut files = Vec::new();
        for idx in 0..diff.deltas().count() {
            let Some(patch) = git2::Patch::from_diff(&diff, idx)? else {
                continue;
            };

            let delta = patch.delta();
            if delta.flags().is_binary() {
                continue;
            }

            let Some(path) = delta.new_file().path().or_else(|| delta.old_file().path()) else {
                continue;
            };

            let (_, additions, deletions) = patch.line_stats()?;
            files.push((
                path.to_string_lossy().to_string(),
                LineDelta::new(additions as u64, deletions as u64),
            ));
        }

        Ok(files)
    }
}

impl CommitSource for Parser {
    fn commits(&self, window: &Window) -> Vec<CommitRecord> {
        match self.parse_commits(window) {
            Ok(commits) => commits,
            Err(e) => {
                warn!(
                    "Could not read commits from {}: {}",
                    self.repo_path.display(),
                    e
                );
                Vec::new()
            }
        }
    }
}
