use crate::filter::FilterConfig;
use crate::git::GitRepo;
use crate::model::{Commit, FileChange};
use log::debug;
use serde::{Deserialize, Serialize};

/// Contribution of a single commit after filtering.
///
/// Diff failures never surface as errors; they leave `counted` false and
/// record the reason in `diagnostic`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOutcome {
    pub lines_changed: u64,
    pub counted: bool,
    /// Included files whose content could not be read as text.
    pub skipped_files: usize,
    pub diagnostic: Option<String>,
}

impl DiffOutcome {
    fn failed(diagnostic: String) -> Self {
        Self {
            diagnostic: Some(diagnostic),
            ..Self::default()
        }
    }
}

/// Fold per-file changes through the filter.
///
/// Unreadable files and files without any line delta (empty additions,
/// mode-only changes) contribute nothing and do not mark the commit as
/// counted. Root-commit files always carry at least one segment.
pub fn reduce_changes(changes: &[FileChange], filter: &FilterConfig) -> DiffOutcome {
    let mut outcome = DiffOutcome::default();
    for change in changes.iter().filter(|c| filter.includes(&c.path)) {
        if !change.readable {
            outcome.skipped_files += 1;
            continue;
        }
        let lines = change.lines_changed();
        if lines == 0 {
            continue;
        }
        outcome.counted = true;
        outcome.lines_changed += lines;
    }
    outcome
}

/// Lines changed by `commit` relative to `parent`, or to the empty tree when
/// `parent` is `None`.
pub fn diff_commit(
    repo: &GitRepo,
    commit: &Commit,
    parent: Option<&str>,
    filter: &FilterConfig,
) -> DiffOutcome {
    let changes = match parent {
        Some(parent_id) => repo.diff_against_parent(&commit.id, parent_id),
        None => repo.root_files(&commit.id),
    };

    match changes {
        Ok(changes) => {
            let outcome = reduce_changes(&changes, filter);
            if outcome.skipped_files > 0 {
                debug!(
                    "commit {}: skipped {} unreadable file(s)",
                    commit.id, outcome.skipped_files
                );
            }
            outcome
        }
        Err(e) => {
            debug!("commit {}: diff failed, not counted: {e}", commit.id);
            DiffOutcome::failed(e.to_string())
        }
    }
}
