use super::read_artifact;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Pass/fail counts from a JUnit XML report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    /// tests − failures − errors, summed over all suites
    pub pass: Option<i64>,
    /// failures + errors, summed over all suites
    pub fail: Option<i64>,
    /// Value of a `coverage` property, if the report carries one
    pub coverage: Option<f64>,
}

/// Parse a JUnit XML report.
///
/// Missing file or malformed content ⇒ `{pass: null, fail: null, coverage: null}`.
pub fn parse(path: Option<&Path>) -> TestSummary {
    let Some(text) = read_artifact(path, "test report") else {
        return TestSummary::default();
    };

    match parse_text(&text) {
        Some(summary) => summary,
        None => {
            if let Some(path) = path {
                warn!("Ignoring malformed test report at {}", path.display());
            }
            TestSummary::default()
        }
    }
}

/// Sums `tests`, `failures` and `errors` over every `<testsuite>` element
/// (nested suites included) and reads `<property name="coverage" value=".."/>`.
///
/// Returns `None` unless the text is a well-formed XML document rooted at
/// `<testsuites>` or `<testsuite>`. Comments and CDATA are not elements, so
/// suites inside them are not counted.
fn parse_text(text: &str) -> Option<TestSummary> {
    let doc = match Document::parse(text.trim_start_matches('\u{feff}')) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("Test report is not well-formed XML: {}", e);
            return None;
        }
    };

    let root = doc.root_element();
    if !root.has_tag_name("testsuites") && !root.has_tag_name("testsuite") {
        return None;
    }

    let (mut total, mut failures, mut errors) = (0i64, 0i64, 0i64);
    for suite in root.descendants().filter(|n| n.has_tag_name("testsuite")) {
        total += count_attr(&suite, "tests")?;
        failures += count_attr(&suite, "failures")?;
        errors += count_attr(&suite, "errors")?;
    }

    let coverage = match root
        .descendants()
        .find(|n| n.has_tag_name("property") && n.attribute("name") == Some("coverage"))
    {
        Some(property) => Some(property.attribute("value")?.trim().parse::<f64>().ok()?),
        None => None,
    };

    Some(TestSummary {
        pass: Some(total - failures - errors),
        fail: Some(failures + errors),
        coverage,
    })
}

/// A missing counter sums as zero; a non-numeric one makes the report malformed
fn count_attr(node: &Node, name: &str) -> Option<i64> {
    match node.attribute(name) {
        Some(value) => value.trim().parse().ok(),
        None => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const REPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="Core" tests="10" failures="1" errors="1">
    <properties>
      <property name="platform" value="Win64"/>
      <property name="coverage" value="72.5"/>
    </properties>
    <testcase name="a"/>
  </testsuite>
  <testsuite name="UI" tests="5" failures="0" errors="0"/>
</testsuites>
"#;

    #[test]
    fn test_sums_suites_and_reads_coverage() {
        let summary = parse_text(REPORT).unwrap();
        assert_eq!(summary.pass, Some(13));
        assert_eq!(summary.fail, Some(2));
        assert_eq!(summary.coverage, Some(72.5));
    }

    #[test]
    fn test_without_coverage_property() {
        let xml = r#"<testsuite tests='3' failures='1'></testsuite>"#;
        let summary = parse_text(xml).unwrap();
        assert_eq!(summary.pass, Some(2));
        assert_eq!(summary.fail, Some(1));
        assert_eq!(summary.coverage, None);
    }

    #[test]
    fn test_empty_suites_document() {
        let summary = parse_text("<testsuites></testsuites>").unwrap();
        assert_eq!(summary.pass, Some(0));
        assert_eq!(summary.fail, Some(0));
    }

    #[test]
    fn test_malformed_content_is_default() {
        assert_eq!(parse_text("not xml at all"), None);
        assert_eq!(parse_text(r#"<testsuite tests="3""#), None);
        assert_eq!(parse_text(r#"<testsuite tests="three"/>"#), None);
        assert_eq!(
            parse_text(r#"<testsuite tests="1"><property name="coverage" value="high"/></testsuite>"#),
            None
        );
    }

    #[test]
    fn test_truncated_document_is_default() {
        let xml = r#"<testsuites><testsuite tests="3" failures="1"><testcase name="a">"#;
        assert_eq!(parse_text(xml), None);
        assert_eq!(parse_text(&REPORT[..REPORT.len() - 20]), None);
    }

    #[test]
    fn test_commented_and_cdata_suites_are_not_counted() {
        let xml = r#"<testsuites>
  <!-- <testsuite tests="100" failures="100"/> -->
  <testsuite tests="4" failures="1">
    <system-out><![CDATA[<testsuite tests="50" errors="50"/>]]></system-out>
  </testsuite>
</testsuites>"#;
        let summary = parse_text(xml).unwrap();
        assert_eq!(summary.pass, Some(3));
        assert_eq!(summary.fail, Some(1));
    }

    #[test]
    fn test_other_root_element_is_default() {
        assert_eq!(parse_text(r#"<coverage line-rate="0.7"/>"#), None);
    }

    #[test]
    fn test_missing_file_is_exact_default() {
        let temp_dir = TempDir::new().unwrap();
        let summary = parse(Some(&temp_dir.path().join("junit.xml")));
        assert_eq!(
            summary,
            TestSummary {
                pass: None,
                fail: None,
                coverage: None
            }
        );
    }

    #[test]
    fn test_malformed_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("junit.xml");
        fs::write(&path, "{\"tests\": 3}").unwrap();
        assert_eq!(parse(Some(&path)), TestSummary::default());
    }

    #[test]
    fn test_reads_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("junit.xml");
        fs::write(&path, REPORT).unwrap();
        assert_eq!(parse(Some(&path)).fail, Some(2));
    }
}
