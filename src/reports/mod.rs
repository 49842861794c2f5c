//! Readers for auxiliary artifacts produced next to the repository: the
//! build log, the packaging (cook) log, a JUnit test report and a static
//! analysis report.
//!
//! Every reader is total. A path that is not configured, does not exist, or
//! holds content that cannot be parsed yields the reader's documented
//! neutral value and a log line, never an error.

pub mod build;
pub mod packaging;
pub mod static_analysis;
pub mod test_results;

pub use build::BuildSummary;
pub use packaging::PackagingSummary;
pub use static_analysis::StaticAnalysisSummary;
pub use test_results::TestSummary;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Locations of the auxiliary artifacts for one run
#[derive(Debug, Clone, Default)]
pub struct ReportPaths {
    pub build_log: Option<PathBuf>,
    pub packaging_log: Option<PathBuf>,
    pub test_results: Option<PathBuf>,
    pub static_analysis: Option<PathBuf>,
}

/// The four external summaries of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSummaries {
    #[serde(default)]
    pub build: BuildSummary,
    #[serde(default)]
    pub packaging: PackagingSummary,
    #[serde(default)]
    pub tests: TestSummary,
    #[serde(default)]
    pub static_analysis: StaticAnalysisSummary,
}

impl ExternalSummaries {
    /// Read all four artifacts
    pub fn collect(paths: &ReportPaths) -> Self {
        Self {
            build: build::parse(paths.build_log.as_deref()),
            packaging: packaging::parse(paths.packaging_log.as_deref()),
            tests: test_results::parse(paths.test_results.as_deref()),
            static_analysis: static_analysis::parse(paths.static_analysis.as_deref()),
        }
    }
}

/// Read a text artifact, replacing invalid UTF-8.
///
/// Returns `None` when no path is configured or the file cannot be read.
fn read_artifact(path: Option<&Path>, kind: &str) -> Option<String> {
    let path = path?;
    if !path.exists() {
        debug!("No {} at {}", kind, path.display());
        return None;
    }

    match fs::read(path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Could not read {} at {}: {}", kind, path.display(), e);
            None
        }
    }
}

/// Lazily compiled pattern; `None` only if the pattern itself is invalid
fn cached_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// First capture group of `re` in `text`, parsed as a number
fn capture_number(re: Option<&Regex>, text: &str) -> Option<u32> {
    re?.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Number of lines in `text` matching `re`
fn count_matching_lines(re: Option<&Regex>, text: &str) -> u32 {
    match re {
        Some(re) => text.lines().filter(|line| re.is_match(line)).count() as u32,
        None => 0,
    }
}
