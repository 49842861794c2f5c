use crate::error::Result;
use std::fs;
use std::path::Path;

/// Scanner for discovering Markdown documents
pub struct Scanner {
    /// Directory names to exclude from scanning
    exclude_patterns: Vec<String>,
    /// Maximum directory depth (None = unlimited)
    max_depth: Option<u32>,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(exclude_patterns: Vec<String>, max_depth: Option<u32>) -> Self {
        Self {
            exclude_patterns,
            max_depth,
        }
    }

    /// Collect `.md` files below `root` as sorted `/`-separated relative paths
    pub fn scan(&self, root: &Path) -> Result<Vec<String>> {
        let mut documents = Vec::new();
        self.scan_recursive(root, "", 0, &mut documents)?;
        documents.sort();
        Ok(documents)
    }

    /// Recursively scan directories
    fn scan_recursive(
        &self,
        path: &Path,
        prefix: &str,
        depth: u32,
        documents: &mut Vec<String>,
    ) -> Result<()> {
        // Check depth limit
        if let Some(max_depth) = self.max_depth {
            if depth >= max_depth {
                return Ok(());
            }
        }

        let entries = match fs::read_dir(path) {
            Ok(entries) => entries,
            Err(_) => {
                // Skip directories we can't read (permission denied, etc.)
                return Ok(());
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(_) => continue,
            };

            let path = entry.path();
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };

            // Skip hidden entries
            if name.starts_with('.') {
                continue;
            }

            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", prefix, name)
            };

            if path.is_dir() {
                if self.should_exclude(&name) {
                    continue;
                }
                self.scan_recursive(&path, &relative, depth + 1, documents)?;
            } else if name.ends_with(".md") {
                documents.push(relative);
            }
        }

        Ok(())
    }

    /// Check if a directory name should be excluded
    fn should_exclude(&self, name: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| name == pattern || name.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# doc\n").unwrap();
    }

    #[test]
    fn test_scanner_finds_markdown() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "README.md");
        touch(temp_dir.path(), "DevLog/Daily/2025-11-12.md");
        touch(temp_dir.path(), "DevLog/Metrics/2025-11-12.json");
        touch(temp_dir.path(), ".honkit/cache.md");

        let scanner = Scanner::new(vec![], None);
        let documents = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(documents, vec!["DevLog/Daily/2025-11-12.md", "README.md"]);
    }

    #[test]
    fn test_scanner_excludes_patterns() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Meeting/a.md");
        touch(temp_dir.path(), "node_modules/pkg/readme.md");
        touch(temp_dir.path(), "_book/index.md");

        let scanner = Scanner::new(vec!["node_modules".to_string(), "_book".to_string()], None);
        let documents = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(documents, vec!["Meeting/a.md"]);
    }

    #[test]
    fn test_scanner_respects_max_depth() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Planning/plan.md");
        touch(temp_dir.path(), "a/b/c/deep.md");

        let scanner = Scanner::new(vec![], Some(2));
        let documents = scanner.scan(temp_dir.path()).unwrap();

        assert_eq!(documents, vec!["Planning/plan.md"]);
    }

    #[test]
    fn test_scanner_missing_root_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = Scanner::new(vec![], None);
        assert!(scanner.scan(&temp_dir.path().join("absent")).unwrap().is_empty());
    }
}
