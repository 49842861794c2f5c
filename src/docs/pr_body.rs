//! Pull-request description for the commits on a branch.

use crate::document::render;
use crate::git::top_changes::TopChange;
use crate::git::CommitRecord;

/// File categories, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileCategory {
    Workflows,
    Scripts,
    DevLog,
    Meeting,
    Docs,
    Source,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 7] = [
        Self::Workflows,
        Self::Scripts,
        Self::DevLog,
        Self::Meeting,
        Self::Docs,
        Self::Source,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Workflows => "Workflows",
            Self::Scripts => "Scripts",
            Self::DevLog => "DevLog",
            Self::Meeting => "Meeting",
            Self::Docs => "Docs",
            Self::Source => "Source",
            Self::Other => "Other",
        }
    }
}

/// First matching rule wins
pub fn categorize(path: &str) -> FileCategory {
    if path.starts_with(".github/workflows") {
        FileCategory::Workflows
    } else if path.starts_with(".github/scripts") || path.starts_with("Tools/") {
        FileCategory::Scripts
    } else if path.starts_with("Documents/DevLog") {
        FileCategory::DevLog
    } else if path.starts_with("Documents/Meeting") {
        FileCategory::Meeting
    } else if path.ends_with(".md") {
        FileCategory::Docs
    } else if path.starts_with("Source/") || path.starts_with("src/") {
        FileCategory::Source
    } else {
        FileCategory::Other
    }
}

/// Distinct files touched by `commits`, in first-seen order
pub fn changed_files(commits: &[CommitRecord]) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    for commit in commits {
        for (path, _) in &commit.files {
            if !files.contains(path) {
                files.push(path.clone());
            }
        }
    }
    files
}

pub fn build_body(commits: &[CommitRecord], top_changes: &[TopChange]) -> String {
    let files = changed_files(commits);
    let grouped: Vec<(FileCategory, Vec<&String>)> = FileCategory::ALL
        .iter()
        .map(|category| {
            let members: Vec<&String> = files.iter().filter(|f| categorize(f) == *category).collect();
            (*category, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect();

    let mut body = String::new();

    body.push_str("## Summary\n\n");
    body.push_str(&format!(
        "- {} file(s) changed across {} commit(s).\n",
        files.len(),
        commits.len()
    ));
    if !top_changes.is_empty() {
        body.push('\n');
        body.push_str(&render::top_changes(top_changes));
        body.push('\n');
    }

    body.push_str("\n## Changes\n");
    for (category, members) in &grouped {
        body.push_str(&format!("\n### {}\n\n", category.label()));
        for file in members {
            body.push_str(&format!("- {}\n", file));
        }
    }

    body.push_str("\n## Impact\n\n");
    if grouped.is_empty() {
        body.push_str("- No files changed.\n");
    }
    for (category, members) in &grouped {
        body.push_str(&format!("- {}: {} file(s)\n", category.label(), members.len()));
    }

    body
}
