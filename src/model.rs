use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

/// A commit as read from the repository, in the author's own time zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub author_name: String,
    pub author_email: String,
    pub timestamp: DateTime<FixedOffset>,
    pub parent_ids: Vec<String>,
}

impl Commit {
    pub fn first_parent(&self) -> Option<&str> {
        self.parent_ids.first().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }
}

/// Per-file line delta between a commit and its parent (or the empty tree).
///
/// `readable` is false when the blob content could not be interpreted as
/// text; such entries carry zero counts and are skipped by the accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub added_lines: u64,
    pub deleted_lines: u64,
    pub readable: bool,
}

impl FileChange {
    pub fn new(path: impl Into<String>, added_lines: u64, deleted_lines: u64) -> Self {
        Self {
            path: path.into(),
            added_lines,
            deleted_lines,
            readable: true,
        }
    }

    pub fn unreadable(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            added_lines: 0,
            deleted_lines: 0,
            readable: false,
        }
    }

    pub fn lines_changed(&self) -> u64 {
        self.added_lines + self.deleted_lines
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub name: String,
    pub commit_count: u64,
    pub lines_changed: u64,
}

impl AuthorStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commit_count: 0,
            lines_changed: 0,
        }
    }

    pub fn record(&mut self, lines_changed: u64) {
        self.commit_count += 1;
        self.lines_changed += lines_changed;
    }

    pub fn absorb(&mut self, other: &AuthorStats) {
        self.commit_count += other.commit_count;
        self.lines_changed += other.lines_changed;
    }
}

/// ISO-8601 (year, week) pair. Orders chronologically and renders as `2024-W07`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WeekKey {
    pub year: i32,
    pub week: u32,
}

impl WeekKey {
    pub fn new(year: i32, week: u32) -> Self {
        Self { year, week }
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, week) = s
            .split_once("-W")
            .ok_or_else(|| format!("Invalid week key: {s}"))?;
        let year = year
            .parse::<i32>()
            .map_err(|e| format!("Invalid week key year '{year}': {e}"))?;
        let week = week
            .parse::<u32>()
            .map_err(|e| format!("Invalid week key week '{week}': {e}"))?;
        if !(1..=53).contains(&week) {
            return Err(format!("Week out of range: {week}"));
        }
        Ok(Self { year, week })
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for WeekKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub key: WeekKey,
    /// Sunday immediately before the ISO week's Monday.
    pub week_start: NaiveDate,
    pub authors: BTreeMap<String, AuthorStats>,
    pub total_commits: u64,
    pub total_lines: u64,
}

impl WeeklyBucket {
    pub fn new(key: WeekKey, week_start: NaiveDate) -> Self {
        Self {
            key,
            week_start,
            authors: BTreeMap::new(),
            total_commits: 0,
            total_lines: 0,
        }
    }
}

/// Counters describing one walk, independent of the inclusion decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub commits_walked: u64,
    pub commits_counted: u64,
    pub commits_with_diagnostics: u64,
    pub files_skipped: u64,
}

impl RunSummary {
    pub fn absorb(&mut self, other: &RunSummary) {
        self.commits_walked += other.commits_walked;
        self.commits_counted += other.commits_counted;
        self.commits_with_diagnostics += other.commits_with_diagnostics;
        self.files_skipped += other.files_skipped;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub authors: BTreeMap<String, AuthorStats>,
    pub weeks: BTreeMap<WeekKey, WeeklyBucket>,
    pub total_commits: u64,
    pub total_lines: u64,
    pub file_filter: String,
    pub ignore_files: BTreeSet<String>,
    pub summary: RunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub version: u32,
    pub repository_path: String,
    pub start: String,
    pub result: AggregationResult,
}
