use crate::diff::{diff_commit, DiffOutcome};
use crate::error::Result;
use crate::filter::FilterConfig;
use crate::git::{GitRepo, WalkOptions};
use crate::model::{AggregationResult, AuthorStats, Commit, WeeklyBucket};
use crate::week::{week_key, week_start};
use gix::ObjectId;
use indicatif::ProgressBar;
use log::info;

impl AggregationResult {
    pub fn new(filter: &FilterConfig) -> Self {
        Self {
            file_filter: filter.extension.clone(),
            ignore_files: filter.ignored.clone(),
            ..Self::default()
        }
    }

    pub fn author_entry(&mut self, name: &str) -> &mut AuthorStats {
        self.authors
            .entry(name.to_string())
            .or_insert_with(|| AuthorStats::new(name))
    }

    /// Add one commit's contribution. Does nothing unless `counted`.
    pub fn accumulate(&mut self, commit: &Commit, lines_changed: u64, counted: bool) {
        if !counted {
            return;
        }

        // Keyed by display name only: one name with several emails is one author.
        self.author_entry(&commit.author_name).record(lines_changed);
        self.total_commits += 1;
        self.total_lines += lines_changed;

        let date = commit.timestamp.date_naive();
        let key = week_key(&commit.timestamp);
        let bucket = self
            .weeks
            .entry(key)
            .or_insert_with(|| WeeklyBucket::new(key, week_start(date)));
        bucket
            .authors
            .entry(commit.author_name.clone())
            .or_insert_with(|| AuthorStats::new(commit.author_name.as_str()))
            .record(lines_changed);
        bucket.total_commits += 1;
        bucket.total_lines += lines_changed;
    }

    /// Fold `other` into `self`, summing every counter pointwise.
    pub fn merge(&mut self, other: &AggregationResult) {
        for (name, stats) in &other.authors {
            self.author_entry(name).absorb(stats);
        }
        for (key, other_bucket) in &other.weeks {
            let bucket = self
                .weeks
                .entry(*key)
                .or_insert_with(|| WeeklyBucket::new(*key, other_bucket.week_start));
            for (name, stats) in &other_bucket.authors {
                bucket
                    .authors
                    .entry(name.clone())
                    .or_insert_with(|| AuthorStats::new(name.as_str()))
                    .absorb(stats);
            }
            bucket.total_commits += other_bucket.total_commits;
            bucket.total_lines += other_bucket.total_lines;
        }
        self.total_commits += other.total_commits;
        self.total_lines += other.total_lines;
        self.ignore_files.extend(other.ignore_files.iter().cloned());
        self.summary.absorb(&other.summary);
    }

    fn note(&mut self, outcome: &DiffOutcome) {
        self.summary.commits_walked += 1;
        if outcome.counted {
            self.summary.commits_counted += 1;
        }
        if outcome.diagnostic.is_some() {
            self.summary.commits_with_diagnostics += 1;
        }
        self.summary.files_skipped += outcome.skipped_files as u64;
    }
}

/// Walk history from `start` and aggregate per-author and per-week totals.
///
/// Only resolving the start or reading a commit can fail; diff failures are
/// absorbed per commit.
pub fn analyze(
    repo: &GitRepo,
    start: ObjectId,
    filter: &FilterConfig,
    options: WalkOptions,
) -> Result<AggregationResult> {
    analyze_with_progress(repo, start, filter, options, &ProgressBar::hidden())
}

pub fn analyze_with_progress(
    repo: &GitRepo,
    start: ObjectId,
    filter: &FilterConfig,
    options: WalkOptions,
    pb: &ProgressBar,
) -> Result<AggregationResult> {
    let mut result = AggregationResult::new(filter);
    pb.set_message("Walking history...");

    for commit in repo.walk(start, options) {
        let commit = commit?;
        let outcome = diff_commit(repo, &commit, commit.first_parent(), filter);
        result.note(&outcome);
        result.accumulate(&commit, outcome.lines_changed, outcome.counted);
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "walked {} commits from {start}: {} counted, {} authors, {} weeks, {} diff failures",
        result.summary.commits_walked,
        result.summary.commits_counted,
        result.authors.len(),
        result.weeks.len(),
        result.summary.commits_with_diagnostics
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .unwrap()
    }

    fn commit(author: &str, email: &str, timestamp: DateTime<FixedOffset>) -> Commit {
        Commit {
            id: format!("{:040x}", timestamp.timestamp()),
            author_name: author.to_string(),
            author_email: email.to_string(),
            timestamp,
            parent_ids: Vec::new(),
        }
    }

    fn assert_totals_consistent(result: &AggregationResult) {
        let commits: u64 = result.authors.values().map(|a| a.commit_count).sum();
        let lines: u64 = result.authors.values().map(|a| a.lines_changed).sum();
        assert_eq!(commits, result.total_commits);
        assert_eq!(lines, result.total_lines);
        for bucket in result.weeks.values() {
            let commits: u64 = bucket.authors.values().map(|a| a.commit_count).sum();
            let lines: u64 = bucket.authors.values().map(|a| a.lines_changed).sum();
            assert_eq!(commits, bucket.total_commits);
            assert_eq!(lines, bucket.total_lines);
        }
        let weekly: u64 = result.weeks.values().map(|b| b.total_commits).sum();
        assert_eq!(weekly, result.total_commits);
    }

    #[test]
    fn uncounted_commit_is_a_no_op() {
        let mut result = AggregationResult::new(&FilterConfig::new());
        result.accumulate(&commit("Alice", "a@x", at(2024, 3, 5)), 42, false);
        assert!(result.authors.is_empty());
        assert!(result.weeks.is_empty());
        assert_eq!(result.total_commits, 0);
        assert_eq!(result.total_lines, 0);
    }

    #[test]
    fn accumulates_per_author_and_week() {
        let mut result = AggregationResult::new(&FilterConfig::new());
        result.accumulate(&commit("Alice", "a@x", at(2024, 3, 5)), 5, true);
        result.accumulate(&commit("Bob", "b@x", at(2024, 3, 6)), 7, true);
        result.accumulate(&commit("Alice", "a@x", at(2024, 3, 12)), 1, true);

        assert_eq!(result.total_commits, 3);
        assert_eq!(result.total_lines, 13);
        assert_eq!(result.authors["Alice"].commit_count, 2);
        assert_eq!(result.authors["Alice"].lines_changed, 6);
        assert_eq!(result.authors["Bob"].lines_changed, 7);

        let keys: Vec<String> = result.weeks.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-W10", "2024-W11"]);

        let first = result.weeks.values().next().unwrap();
        assert_eq!(first.week_start, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert_eq!(first.total_commits, 2);
        assert_eq!(first.total_lines, 12);
        assert_eq!(first.authors.len(), 2);
        assert_totals_consistent(&result);
    }

    #[test]
    fn authors_are_keyed_by_display_name() {
        let mut result = AggregationResult::new(&FilterConfig::new());
        result.accumulate(&commit("Sam", "sam@work", at(2024, 1, 10)), 2, true);
        result.accumulate(&commit("Sam", "sam@home", at(2024, 1, 10)), 3, true);
        result.accumulate(&commit("sam", "sam@work", at(2024, 1, 10)), 4, true);

        assert_eq!(result.authors.len(), 2);
        assert_eq!(result.authors["Sam"].commit_count, 2);
        assert_eq!(result.authors["Sam"].lines_changed, 5);
        assert_eq!(result.authors["sam"].commit_count, 1);
    }

    #[test]
    fn new_year_friday_lands_in_previous_iso_year() {
        let mut result = AggregationResult::new(&FilterConfig::new());
        result.accumulate(&commit("Alice", "a@x", at(2021, 1, 1)), 1, true);
        let (key, bucket) = result.weeks.iter().next().unwrap();
        assert_eq!(key.to_string(), "2020-W53");
        assert_eq!(bucket.week_start, NaiveDate::from_ymd_opt(2020, 12, 27).unwrap());
    }

    #[test]
    fn records_active_filter() {
        let filter = FilterConfig::new().with_extension(".rs").ignore("build.rs");
        let result = AggregationResult::new(&filter);
        assert_eq!(result.file_filter, ".rs");
        assert!(result.ignore_files.contains("build.rs"));
    }

    #[test]
    fn merge_is_pointwise_and_order_independent() {
        let filter = FilterConfig::new();
        let mut a = AggregationResult::new(&filter);
        a.accumulate(&commit("Alice", "a@x", at(2024, 3, 5)), 5, true);
        a.accumulate(&commit("Bob", "b@x", at(2024, 4, 1)), 2, true);
        let mut b = AggregationResult::new(&filter);
        b.accumulate(&commit("Alice", "a@x", at(2024, 3, 6)), 3, true);
        b.accumulate(&commit("Carol", "c@x", at(2024, 5, 1)), 9, true);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);

        assert_eq!(ab.total_commits, 4);
        assert_eq!(ab.total_lines, 19);
        assert_eq!(ab.authors["Alice"].commit_count, 2);
        assert_eq!(ab.authors["Alice"].lines_changed, 8);
        assert_eq!(ab.weeks.len(), 3);
        assert_totals_consistent(&ab);
    }
}
