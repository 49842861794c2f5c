use super::{cached_regex, count_matching_lines, read_artifact};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Outcome of a build tool run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// `None` when no log was available
    pub success: Option<bool>,
    /// Target named on the `Building <target> - ...` line
    #[serde(default)]
    pub target: String,
    /// Lines carrying a compiler `: error:` diagnostic
    #[serde(default)]
    pub errors: u32,
}

/// Parse a build log. Missing or unreadable ⇒ `{success: null, target: "", errors: 0}`
pub fn parse(path: Option<&Path>) -> BuildSummary {
    match read_artifact(path, "build log") {
        Some(text) => parse_text(&text),
        None => BuildSummary::default(),
    }
}

fn parse_text(text: &str) -> BuildSummary {
    static TARGET: OnceLock<Option<Regex>> = OnceLock::new();
    static ERROR_LINE: OnceLock<Option<Regex>> = OnceLock::new();

    let target = cached_regex(&TARGET, r"Building\s+(.+?)\s+-\s+(.+)")
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    BuildSummary {
        success: Some(!text.contains("Error") && !text.contains("BUILD FAILED")),
        target,
        errors: count_matching_lines(cached_regex(&ERROR_LINE, r": error:"), text),
    }
}
