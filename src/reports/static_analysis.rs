use super::read_artifact;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Warning counts from a static-analysis report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAnalysisSummary {
    /// Current warning count; `None` when no report was available
    pub warn_now: Option<u64>,
    /// Warning count of the previous analysis
    #[serde(default)]
    pub warn_prev: u64,
    /// New high-severity findings
    #[serde(default)]
    pub high_new: u64,
}

impl Default for StaticAnalysisSummary {
    fn default() -> Self {
        Self {
            warn_now: None,
            warn_prev: 0,
            high_new: 0,
        }
    }
}

/// Parse a JSON report shaped `{"warnings": n, "warnings_prev": n, "high_new": n}`.
///
/// Missing or malformed ⇒ `{warn_now: null, warn_prev: 0, high_new: 0}`.
/// Absent keys inside a valid report count as 0.
pub fn parse(path: Option<&Path>) -> StaticAnalysisSummary {
    let Some(text) = read_artifact(path, "static-analysis report") else {
        return StaticAnalysisSummary::default();
    };

    match parse_text(&text) {
        Some(summary) => summary,
        None => {
            if let Some(path) = path {
                warn!("Ignoring malformed static-analysis report at {}", path.display());
            }
            StaticAnalysisSummary::default()
        }
    }
}

fn parse_text(text: &str) -> Option<StaticAnalysisSummary> {
    let value: Value = serde_json::from_str(text).ok()?;
    let report = value.as_object()?;

    let count = |key: &str| -> Option<u64> {
        match report.get(key) {
            None | Some(Value::Null) => Some(0),
            Some(v) => v.as_u64(),
        }
    };

    Some(StaticAnalysisSummary {
        warn_now: Some(count("warnings")?),
        warn_prev: count("warnings_prev")?,
        high_new: count("high_new")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_full_report() {
        let summary = parse_text(r#"{"warnings": 41, "warnings_prev": 45, "high_new": 2}"#).unwrap();
        assert_eq!(
            summary,
            StaticAnalysisSummary {
                warn_now: Some(41),
                warn_prev: 45,
                high_new: 2
            }
        );
    }

    #[test]
    fn test_absent_keys_count_as_zero() {
        let summary = parse_text(r#"{"tool": "clang-tidy"}"#).unwrap();
        assert_eq!(summary.warn_now, Some(0));
        assert_eq!(summary.warn_prev, 0);
        assert_eq!(summary.high_new, 0);
    }

    #[test]
    fn test_malformed_reports() {
        assert_eq!(parse_text("{warnings: 3"), None);
        assert_eq!(parse_text("[1, 2, 3]"), None);
        assert_eq!(parse_text(r#"{"warnings": "many"}"#), None);
        assert_eq!(parse_text(r#"{"warnings": -1}"#), None);
    }

    #[test]
    fn test_missing_or_malformed_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let expected = StaticAnalysisSummary {
            warn_now: None,
            warn_prev: 0,
            high_new: 0,
        };
        assert_eq!(parse(Some(&temp_dir.path().join("static.json"))), expected);

        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "<<<").unwrap();
        assert_eq!(parse(Some(&path)), expected);
    }
}
