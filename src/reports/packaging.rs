use super::{cached_regex, capture_number, count_matching_lines, read_artifact};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// Counts from a content packaging (cook) run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingSummary {
    #[serde(default)]
    pub cooked: u32,
    #[serde(default)]
    pub skipped: u32,
    /// Lines containing an `Error` token
    #[serde(default)]
    pub errors: u32,
}

/// Parse a packaging log. Missing or unreadable ⇒ all zeros
pub fn parse(path: Option<&Path>) -> PackagingSummary {
    match read_artifact(path, "packaging log") {
        Some(text) => parse_text(&text),
        None => PackagingSummary::default(),
    }
}

fn parse_text(text: &str) -> PackagingSummary {
    static COOKED: OnceLock<Option<Regex>> = OnceLock::new();
    static SKIPPED: OnceLock<Option<Regex>> = OnceLock::new();
    static ERROR: OnceLock<Option<Regex>> = OnceLock::new();

    PackagingSummary {
        cooked: capture_number(cached_regex(&COOKED, r"Cooked\s+(\d+)"), text).unwrap_or(0),
        skipped: capture_number(cached_regex(&SKIPPED, r"Skipped\s+(\d+)"), text).unwrap_or(0),
        errors: count_matching_lines(cached_regex(&ERROR, r"\bError\b"), text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counts() {
        let log = "LogCook: Display: Cooked 1520 packages\n\
                   LogCook: Display: Skipped 37 packages\n\
                   LogCook: Error: missing asset /Game/Foo\n\
                   LogCook: Warning: deprecated\n\
                   LogCook: Error: missing asset /Game/Bar\n";
        let summary = parse_text(log);
        assert_eq!(summary.cooked, 1520);
        assert_eq!(summary.skipped, 37);
        assert_eq!(summary.errors, 2);
    }

    #[test]
    fn test_absent_labels_default_to_zero() {
        let summary = parse_text("LogCook: nothing to do\n");
        assert_eq!(summary, PackagingSummary::default());
    }

    #[test]
    fn test_missing_file_is_all_zero() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            parse(Some(&temp_dir.path().join("cook.log"))),
            PackagingSummary {
                cooked: 0,
                skipped: 0,
                errors: 0
            }
        );
    }
}
