use crate::git::GitRepo;
use crate::model::{AggregationResult, AuthorStats, StatsOutput, WeeklyBucket, SCHEMA_VERSION};
use anyhow::Result;
use console::style;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Average lines changed per commit for each author; 0 for authors without commits.
pub fn average_commit_size(result: &AggregationResult) -> BTreeMap<String, f64> {
    result
        .authors
        .iter()
        .map(|(name, stats)| (name.clone(), average(stats)))
        .collect()
}

fn average(stats: &AuthorStats) -> f64 {
    if stats.commit_count > 0 {
        stats.lines_changed as f64 / stats.commit_count as f64
    } else {
        0.0
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorRow {
    pub name: String,
    pub commits: u64,
    pub lines_changed: u64,
    pub lines_percent: f64,
    pub commits_percent: f64,
    pub average_commit_size: f64,
}

/// Author rows, most commits first; ties ordered by name.
pub fn author_rows(result: &AggregationResult) -> Vec<AuthorRow> {
    let mut rows: Vec<AuthorRow> = result
        .authors
        .values()
        .map(|stats| AuthorRow {
            name: stats.name.clone(),
            commits: stats.commit_count,
            lines_changed: stats.lines_changed,
            lines_percent: percent(stats.lines_changed, result.total_lines),
            commits_percent: percent(stats.commit_count, result.total_commits),
            average_commit_size: average(stats),
        })
        .collect();
    rows.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Weeks in date order, each with its authors by lines changed descending.
pub fn weekly_rows(result: &AggregationResult) -> Vec<(&WeeklyBucket, Vec<&AuthorStats>)> {
    let mut weeks: Vec<&WeeklyBucket> = result.weeks.values().collect();
    weeks.sort_by_key(|bucket| bucket.week_start);
    weeks
        .into_iter()
        .map(|bucket| {
            let mut authors: Vec<&AuthorStats> = bucket.authors.values().collect();
            authors.sort_by(|a, b| {
                b.lines_changed
                    .cmp(&a.lines_changed)
                    .then_with(|| a.name.cmp(&b.name))
            });
            (bucket, authors)
        })
        .collect()
}

pub fn write_author_table<W: Write>(out: &mut W, result: &AggregationResult) -> io::Result<()> {
    writeln!(
        out,
        "{:<30} {:>8} {:>14} {:>16} {:>10} {:>18}",
        style("Author").bold(),
        style("Commits").bold(),
        style("Lines Changed").bold(),
        style("Lines Changed %").bold(),
        style("Commits %").bold(),
        style("Avg Lines/Commit").bold()
    )?;
    writeln!(out, "{}", "─".repeat(101))?;
    for row in author_rows(result) {
        writeln!(
            out,
            "{:<30} {:>8} {:>14} {:>15.1}% {:>9.1}% {:>18.1}",
            row.name,
            row.commits,
            row.lines_changed,
            row.lines_percent,
            row.commits_percent,
            row.average_commit_size
        )?;
    }
    writeln!(out, "{}", "─".repeat(101))?;
    writeln!(
        out,
        "{:<30} {:>8} {:>14} {:>16} {:>10} {:>18}",
        style("TOTAL").bold(),
        result.total_commits,
        result.total_lines,
        "100%",
        "100%",
        ""
    )
}

pub fn write_weekly_table<W: Write>(out: &mut W, result: &AggregationResult) -> io::Result<()> {
    writeln!(
        out,
        "{:<12} {:<30} {:>14} {:>11} {:>8}",
        style("Week").bold(),
        style("Author").bold(),
        style("Lines Changed").bold(),
        style("Lines/Week").bold(),
        style("Commits").bold()
    )?;
    writeln!(out, "{}", "─".repeat(79))?;
    for (bucket, authors) in weekly_rows(result) {
        let week = bucket.week_start.format("%Y-%m-%d").to_string();
        for (i, author) in authors.iter().enumerate() {
            writeln!(
                out,
                "{:<12} {:<30} {:>14} {:>11.1} {:>8}",
                if i == 0 { week.as_str() } else { "" },
                author.name,
                author.lines_changed,
                author.lines_changed as f64,
                author.commit_count
            )?;
        }
        if !authors.is_empty() {
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn output_table(result: &AggregationResult, weekly: bool) -> Result<()> {
    if result.total_commits == 0 {
        println!("No matching commits");
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    if weekly {
        write_weekly_table(&mut stdout, result)?;
    } else {
        write_author_table(&mut stdout, result)?;
    }
    Ok(())
}

pub fn output_json(result: &AggregationResult, repo: &GitRepo, start: &str) -> Result<()> {
    let output = StatsOutput {
        version: SCHEMA_VERSION,
        repository_path: repo.path().to_string_lossy().to_string(),
        start: start.to_string(),
        result: result.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
