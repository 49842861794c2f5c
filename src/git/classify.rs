use crate::git::ChangeType;
use regex::Regex;
use std::sync::OnceLock;

/// Types in match order; the first whose token heads the subject wins
const TYPES: [(&str, ChangeType); 8] = [
    ("feat", ChangeType::Feature),
    ("fix", ChangeType::Fix),
    ("docs", ChangeType::Docs),
    ("style", ChangeType::Style),
    ("refactor", ChangeType::Refactor),
    ("test", ChangeType::Test),
    ("chore", ChangeType::Chore),
    ("perf", ChangeType::Performance),
];

/// `<type>[(scope)][!]:` at the very start of the subject
fn header() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^(feat|fix|docs|style|refactor|test|chore|perf)(\([^)]*\))?!?:").ok()
        })
        .as_ref()
}

/// Classify a commit subject by its conventional-commit header.
///
/// The type token must be followed by an optional `(scope)`, an optional
/// `!` and a colon, so `Fix typo` or `feature flags` stay `Other`.
pub fn classify(subject: &str) -> ChangeType {
    let Some(token) = header()
        .and_then(|re| re.captures(subject))
        .and_then(|caps| caps.get(1))
    else {
        return ChangeType::Other;
    };

    let token = token.as_str().to_ascii_lowercase();
    TYPES
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, change_type)| *change_type)
        .unwrap_or(ChangeType::Other)
}

/// Extract the first `#<digits>` reference (issue or PR number) from a subject
pub fn extract_reference(subject: &str) -> Option<u64> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

    let re = PATTERN.get_or_init(|| Regex::new(r"#(\d+)").ok()).as_ref()?;
    re.captures(subject)?
        .get(1)?
        .as_str()
        .parse::<u64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_conventional_prefixes() {
        assert_eq!(classify("feat: add login"), ChangeType::Feature);
        assert_eq!(classify("fix(auth): null pointer"), ChangeType::Fix);
        assert_eq!(classify("docs: readme"), ChangeType::Docs);
        assert_eq!(classify("style: fmt"), ChangeType::Style);
        assert_eq!(classify("refactor: split module"), ChangeType::Refactor);
        assert_eq!(classify("test: cover parser"), ChangeType::Test);
        assert_eq!(classify("chore: bump deps"), ChangeType::Chore);
        assert_eq!(classify("perf: cache lookups"), ChangeType::Performance);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("FEAT: shout"), ChangeType::Feature);
        assert_eq!(classify("Fix(ui): button"), ChangeType::Fix);
        assert_eq!(classify("feat(api)!: drop v1"), ChangeType::Feature);
        assert_eq!(classify("refactor(): empty scope"), ChangeType::Refactor);
    }

    #[test]
    fn test_classify_requires_header_colon() {
        assert_eq!(classify("Fix typo"), ChangeType::Other);
        assert_eq!(classify("feature flags"), ChangeType::Other);
        assert_eq!(classify("testing harness"), ChangeType::Other);
        assert_eq!(classify("fixup! feat: x"), ChangeType::Other);
        assert_eq!(classify("feat : spaced colon"), ChangeType::Other);
        assert_eq!(classify("  chore: leading spaces"), ChangeType::Other);
        assert_eq!(classify("add feat: toggle"), ChangeType::Other);
    }

    #[test]
    fn test_classify_unrecognized_is_other() {
        assert_eq!(classify("Merge branch 'main'"), ChangeType::Other);
        assert_eq!(classify("update stuff"), ChangeType::Other);
        assert_eq!(classify(""), ChangeType::Other);
        assert_eq!(classify("🚀 release"), ChangeType::Other);
    }

    #[test]
    fn test_extract_reference() {
        assert_eq!(extract_reference("feat: add login (#42)"), Some(42));
        assert_eq!(extract_reference("Merge pull request #101 from user/branch"), Some(101));
        assert_eq!(extract_reference("fix #7 and #8"), Some(7));
        assert_eq!(extract_reference("fix: null pointer"), None);
        assert_eq!(extract_reference("issue # 12"), None);
        assert_eq!(extract_reference("fix: overflow (#4294967296)"), Some(4_294_967_296));
    }
}
