//! Markdown reports made of `## `-headed sections whose bodies are replaced
//! independently of one another.

pub mod render;

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SECTION_PREFIX: &str = "## ";

/// Replace the body of the section headed `## <header>`, or append it.
///
/// The body runs from the end of the header line to the next `## ` line or
/// the end of the document. It becomes `new_body` trimmed and followed by a
/// blank line. Everything outside that range is kept byte-for-byte.
/// Applying the same update twice yields the same text as applying it once.
pub fn update_section(document: &str, header: &str, new_body: &str) -> String {
    let body = format!("{}\n\n", demote_headers(new_body.trim()));

    let Some((body_start, body_end, needs_newline)) = section_bounds(document, header) else {
        let mut out = document.to_string();
        if !out.is_empty() {
            if !out.ends_with('\n') {
                out.push('\n');
            }
            if !out.ends_with("\n\n") {
                out.push('\n');
            }
        }
        out.push_str(SECTION_PREFIX);
        out.push_str(header);
        out.push('\n');
        out.push_str(&body);
        return out;
    };

    let mut out = String::with_capacity(document.len() + body.len());
    out.push_str(&document[..body_start]);
    if needs_newline {
        out.push('\n');
    }
    out.push_str(&body);
    out.push_str(&document[body_end..]);
    out
}

/// Byte range of a section body, and whether the header line is unterminated
fn section_bounds(document: &str, header: &str) -> Option<(usize, usize, bool)> {
    let mut offset = 0;
    let mut body_start = None;

    for line in document.split_inclusive('\n') {
        let line_end = offset + line.len();
        let content = line.trim_end_matches(['\n', '\r']);

        match body_start {
            None => {
                if content
                    .strip_prefix(SECTION_PREFIX)
                    .is_some_and(|h| h == header)
                {
                    body_start = Some((line_end, !line.ends_with('\n')));
                }
            }
            Some((start, unterminated)) => {
                if line.starts_with(SECTION_PREFIX) {
                    return Some((start, offset, unterminated));
                }
            }
        }

        offset = line_end;
    }

    body_start.map(|(start, unterminated)| (start, document.len(), unterminated))
}

/// A body line opening a `## ` section would split the body on the next update
fn demote_headers(body: &str) -> String {
    if !body.lines().any(|l| l.starts_with(SECTION_PREFIX)) {
        return body.to_string();
    }

    body.lines()
        .map(|line| {
            if line.starts_with(SECTION_PREFIX) {
                format!("#{}", line)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A report file being edited section by section
#[derive(Debug, Clone)]
pub struct ReportDocument {
    path: PathBuf,
    text: String,
}

impl ReportDocument {
    /// Load the report at `path`, or start a new one holding just `# <title>`
    pub fn load_or_init(path: &Path, title: &str) -> Result<Self> {
        let text = if path.exists() {
            fs::read_to_string(path)?
        } else {
            debug!("Starting new report at {}", path.display());
            format!("# {}\n", title)
        };

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    pub fn update_section(&mut self, header: &str, body: &str) {
        self.text = update_section(&self.text, header, body);
    }

    /// Write with trailing whitespace normalised to a single newline
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut text = self.text.trim_end().to_string();
        text.push('\n');
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = "# Daily DevLog — 2025-11-12\n\n\
                       ## 1. Top Changes\n- old item\n\n\
                       ## Notes\nHand-written  \n  trailing spaces kept\n\n\n\
                       ## Generated At\nGenerated at: yesterday\n";

    #[test]
    fn test_replaces_existing_body() {
        let updated = update_section(DOC, "1. Top Changes", "  - [feat] add login  \n");
        assert!(updated.contains("## 1. Top Changes\n- [feat] add login\n\n## Notes\n"));
        assert!(!updated.contains("old item"));
    }

    #[test]
    fn test_unrelated_sections_are_byte_identical() {
        let updated = update_section(DOC, "1. Top Changes", "new");
        let notes = "## Notes\nHand-written  \n  trailing spaces kept\n\n\n";
        assert!(DOC.contains(notes));
        assert!(updated.contains(notes));
        assert!(updated.starts_with("# Daily DevLog — 2025-11-12\n\n## 1. Top Changes\n"));
        assert!(updated.ends_with("## Generated At\nGenerated at: yesterday\n"));
    }

    #[test]
    fn test_idempotent() {
        let once = update_section(DOC, "Generated At", "Generated at: now");
        let twice = update_section(&once, "Generated At", "Generated at: now");
        assert_eq!(once, twice);

        let appended = update_section(DOC, "5. Summary", "A quiet day.");
        assert_eq!(appended, update_section(&appended, "5. Summary", "A quiet day."));
    }

    #[test]
    fn test_appends_missing_section_at_end() {
        let updated = update_section(DOC, "5. Summary", "A quiet day.");
        assert!(updated.starts_with(DOC));
        assert!(updated.ends_with("Generated at: yesterday\n\n## 5. Summary\nA quiet day.\n\n"));
    }

    #[test]
    fn test_header_must_match_exactly() {
        let doc = "# T\n\n## 1. Top Changes (draft)\nkeep\n";
        let updated = update_section(doc, "1. Top Changes", "x");
        assert!(updated.contains("## 1. Top Changes (draft)\nkeep\n"));
        assert!(updated.ends_with("## 1. Top Changes\nx\n\n"));
    }

    #[test]
    fn test_deeper_headers_stay_inside_body() {
        let doc = "## A\nintro\n### detail\nmore\n## B\nb\n";
        let updated = update_section(doc, "A", "replaced");
        assert_eq!(updated, "## A\nreplaced\n\n## B\nb\n");
    }

    #[test]
    fn test_body_headers_are_demoted() {
        let once = update_section("# T\n", "5. Summary", "## Highlights\n- shipped");
        assert!(once.contains("### Highlights"));
        let twice = update_section(&once, "5. Summary", "## Highlights\n- shipped");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unterminated_header_line() {
        let updated = update_section("# T\n\n## A", "A", "body");
        assert_eq!(updated, "# T\n\n## A\nbody\n\n");
    }

    #[test]
    fn test_crlf_header_line() {
        let updated = update_section("## A\r\nold\r\n## B\r\nb\r\n", "A", "new");
        assert_eq!(updated, "## A\r\nnew\n\n## B\r\nb\r\n");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(update_section("", "A", "body"), "## A\nbody\n\n");
    }

    #[test]
    fn test_load_or_init_and_save() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("DevLog/Daily/2025-11-12.md");

        let mut doc = ReportDocument::load_or_init(&path, "Daily DevLog — 2025-11-12").unwrap();
        assert_eq!(doc.text, "# Daily DevLog — 2025-11-12\n");

        doc.update_section("1. Top Changes", "- [feat] add login");
        doc.update_section("Generated At", "Generated at: now");
        doc.save().unwrap();

        let saved = fs::read_to_string(&path).unwrap();
        assert_eq!(
            saved,
            "# Daily DevLog — 2025-11-12\n\n## 1. Top Changes\n- [feat] add login\n\n\
             ## Generated At\nGenerated at: now\n"
        );

        // A second run over the saved file is stable
        let mut again = ReportDocument::load_or_init(&path, "ignored").unwrap();
        again.update_section("1. Top Changes", "- [feat] add login");
        again.update_section("Generated At", "Generated at: now");
        again.save().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), saved);
    }
}
