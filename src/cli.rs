use crate::aggregate::analyze_with_progress;
use crate::filter::{load_ignore_file, parse_ignore_list, FilterConfig};
use crate::git::{GitRepo, WalkOptions};
use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitstics")]
#[command(about = "Per-author commit and line statistics from git history")]
#[command(version)]
pub struct Cli {
    #[arg(help = "Repository path, or an extension filter when it starts with '.'")]
    pub target: Option<String>,

    #[arg(help = "Extension filter (e.g. .go, .js)")]
    pub extension: Option<String>,

    #[arg(long = "ext", help = "Extension filter, matched as a literal path suffix")]
    pub ext: Option<String>,

    #[arg(long, help = "Comma-separated list of additional files to ignore")]
    pub ignore: Option<String>,

    #[arg(long, help = "Do not ignore common dependency lockfiles")]
    pub no_default_ignores: bool,

    #[arg(long, help = "Do not read ignore entries from the repository's .gitignore")]
    pub no_gitignore: bool,

    #[arg(long, help = "Start from this revision instead of HEAD")]
    pub rev: Option<String>,

    #[arg(long, help = "Follow every parent instead of only first parents")]
    pub all_parents: bool,

    #[arg(long, help = "Stop after walking this many commits")]
    pub max_commits: Option<usize>,

    #[arg(long, help = "Show weekly code frequency statistics")]
    pub weekly: bool,

    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, short, help = "Hide the progress spinner")]
    pub quiet: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Repository path and extension filter from the positional arguments.
    ///
    /// A first positional starting with `.` is the filter and the repository
    /// defaults to the current directory; positional filters win over `--ext`.
    pub fn resolve_target(&self) -> (PathBuf, String) {
        let mut repo = PathBuf::from(".");
        let mut filter = self.ext.clone().unwrap_or_default();

        if let Some(first) = &self.target {
            if first.starts_with('.') && first.len() > 1 && !first.starts_with("./") && !first.starts_with("..") {
                filter = first.clone();
            } else {
                repo = PathBuf::from(first);
                if let Some(ext) = self.extension.as_ref().filter(|e| e.starts_with('.')) {
                    filter = ext.clone();
                }
            }
        }
        (repo, filter)
    }

    pub fn filter_config(&self, repo_root: &std::path::Path, extension: String) -> Result<FilterConfig> {
        let mut filter = FilterConfig::new().with_extension(extension);

        if !self.no_gitignore {
            let entries = load_ignore_file(&repo_root.join(".gitignore"))
                .context("Failed to read .gitignore")?;
            debug!("{} ignore entries from .gitignore", entries.len());
            filter = filter.ignore_all(entries);
        }
        if !self.no_default_ignores {
            filter = filter.with_default_ignores();
        }
        if let Some(raw) = &self.ignore {
            filter = filter.ignore_all(parse_ignore_list(raw));
        }
        Ok(filter)
    }

    pub fn walk_options(&self) -> WalkOptions {
        let mut options = WalkOptions::default();
        if self.all_parents {
            options = options.all_parents();
        }
        if let Some(max) = self.max_commits {
            options = options.limit(max);
        }
        options
    }

    pub fn execute(self) -> Result<()> {
        let (repo_path, extension) = self.resolve_target();
        let repo = GitRepo::open(Some(&repo_path)).context("Failed to open git repository")?;
        let filter = self.filter_config(repo.path(), extension)?;

        let start = repo
            .resolve_start(self.rev.as_deref())
            .context("Failed to resolve start commit")?;

        let pb = if self.quiet || self.json {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {msg} {pos} commits")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        };

        let result = analyze_with_progress(&repo, start, &filter, self.walk_options(), &pb)
            .context("Failed to analyze repository")?;

        if self.json {
            crate::report::output_json(&result, &repo, &start.to_string())
        } else {
            crate::report::output_table(&result, self.weekly)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gitstics").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn leading_dot_positional_is_a_filter() {
        assert_eq!(cli(&[".go"]).resolve_target(), (PathBuf::from("."), ".go".to_string()));
    }

    #[test]
    fn repo_then_filter_positionals() {
        assert_eq!(
            cli(&["/src/project", ".rs"]).resolve_target(),
            (PathBuf::from("/src/project"), ".rs".to_string())
        );
        assert_eq!(
            cli(&["/src/project", "rs"]).resolve_target(),
            (PathBuf::from("/src/project"), String::new())
        );
    }

    #[test]
    fn relative_paths_are_repositories() {
        assert_eq!(cli(&["./repo"]).resolve_target().0, PathBuf::from("./repo"));
        assert_eq!(cli(&[".."]).resolve_target().0, PathBuf::from(".."));
    }

    #[test]
    fn ext_flag_used_without_positional_filter() {
        assert_eq!(cli(&["--ext", ".js"]).resolve_target().1, ".js");
        assert_eq!(cli(&["--ext", ".js", ".ts"]).resolve_target().1, ".ts");
    }

    #[test]
    fn walk_options_from_flags() {
        let options = cli(&["--all-parents", "--max-commits", "5"]).walk_options();
        assert_eq!(options, WalkOptions::default().all_parents().limit(5));
    }

    #[test]
    fn filter_config_layers_ignore_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "dist\n# comment\n").unwrap();

        let filter = cli(&["--ignore", "a.txt, b.txt"])
            .filter_config(dir.path(), String::new())
            .unwrap();
        for entry in ["dist", "Cargo.lock", "a.txt", "b.txt"] {
            assert!(filter.ignored.contains(entry), "missing {entry}");
        }

        let bare = cli(&["--no-gitignore", "--no-default-ignores"])
            .filter_config(dir.path(), ".rs".into())
            .unwrap();
        assert!(bare.ignored.is_empty());
        assert_eq!(bare.extension, ".rs");
    }
}
