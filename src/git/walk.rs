use crate::error::{Result, StatsError};
use crate::git::GitRepo;
use crate::model::Commit;
use gix::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkMode {
    /// Follow only each commit's first parent.
    #[default]
    FirstParent,
    /// Visit every reachable commit, depth-first, first parent first.
    AllParents,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkOptions {
    pub mode: WalkMode,
    pub max_commits: Option<usize>,
}

impl WalkOptions {
    pub fn all_parents(mut self) -> Self {
        self.mode = WalkMode::AllParents;
        self
    }

    pub fn limit(mut self, max_commits: usize) -> Self {
        self.max_commits = Some(max_commits);
        self
    }
}

/// Lazy, single-pass iterator over history from a start commit, newest first.
///
/// Each commit is yielded at most once. The first error ends the walk.
pub struct HistoryWalk<'repo> {
    repo: &'repo GitRepo,
    stack: Vec<ObjectId>,
    seen: HashSet<ObjectId>,
    options: WalkOptions,
    yielded: usize,
}

impl<'repo> HistoryWalk<'repo> {
    pub(crate) fn new(repo: &'repo GitRepo, start: ObjectId, options: WalkOptions) -> Self {
        Self {
            repo,
            stack: vec![start],
            seen: HashSet::new(),
            options,
            yielded: 0,
        }
    }

    fn push_parents(&mut self, commit: &Commit) -> Result<()> {
        let parents: &[String] = match self.options.mode {
            WalkMode::FirstParent => &commit.parent_ids[..commit.parent_ids.len().min(1)],
            WalkMode::AllParents => &commit.parent_ids,
        };
        // Reversed so the first parent is popped next.
        for parent in parents.iter().rev() {
            let id = ObjectId::from_hex(parent.as_bytes())
                .map_err(|e| StatsError::GitRepo(format!("Invalid parent ID '{parent}': {e}")))?;
            if !self.seen.contains(&id) {
                self.stack.push(id);
            }
        }
        Ok(())
    }
}

impl Iterator for HistoryWalk<'_> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(max) = self.options.max_commits {
            if self.yielded >= max {
                return None;
            }
        }

        while let Some(commit_id) = self.stack.pop() {
            if !self.seen.insert(commit_id) {
                continue;
            }

            let commit = match self.repo.read_commit(commit_id) {
                Ok(commit) => commit,
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            };
            if let Err(e) = self.push_parents(&commit) {
                self.stack.clear();
                return Some(Err(e));
            }

            self.yielded += 1;
            return Some(Ok(commit));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builders() {
        let options = WalkOptions::default();
        assert_eq!(options.mode, WalkMode::FirstParent);
        assert_eq!(options.max_commits, None);

        let options = options.all_parents().limit(10);
        assert_eq!(options.mode, WalkMode::AllParents);
        assert_eq!(options.max_commits, Some(10));
    }
}
