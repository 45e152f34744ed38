use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Dependency lockfiles that are ignored unless the caller opts out.
pub const DEFAULT_IGNORED_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "go.sum",
    "Cargo.lock",
    "Gemfile.lock",
];

/// Whether `path` counts toward statistics.
///
/// The ignore set is matched exactly, with no globbing or directory
/// semantics, and is checked before the extension filter. A non-empty
/// `extension_filter` is a literal suffix, not an extension: `go` also
/// accepts `cargo`.
pub fn include(path: &str, extension_filter: &str, ignored: &BTreeSet<String>) -> bool {
    if ignored.contains(path) {
        return false;
    }
    if !extension_filter.is_empty() && !path.ends_with(extension_filter) {
        return false;
    }
    true
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub extension: String,
    pub ignored: BTreeSet<String>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_default_ignores(self) -> Self {
        self.ignore_all(DEFAULT_IGNORED_FILES.iter().copied())
    }

    pub fn ignore(mut self, path: impl Into<String>) -> Self {
        self.ignored.insert(path.into());
        self
    }

    pub fn ignore_all<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn includes(&self, path: &str) -> bool {
        include(path, &self.extension, &self.ignored)
    }
}

/// Parse a comma-separated ignore list, trimming each entry.
pub fn parse_ignore_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read a `.gitignore`-style file as literal ignore entries.
///
/// Blank lines and `#` comments are dropped; every other trimmed line is
/// kept verbatim. A missing file is not an error.
pub fn load_ignore_file(path: &Path) -> Result<Vec<String>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
