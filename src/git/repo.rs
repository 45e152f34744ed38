use crate::error::{Result, StatsError};
use crate::git::walk::{HistoryWalk, WalkOptions};
use crate::model::{Commit, FileChange};
use chrono::{DateTime, FixedOffset};
use gix::object::tree::diff::ChangeDetached;
use gix::objs::tree::EntryMode;
use gix::{discover, ObjectId, Repository};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();

        Ok(Self { repo, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn head_id(&self) -> Result<ObjectId> {
        let mut head = self.repo.head()?;
        let head_commit = head.peel_to_commit_in_place()?;
        Ok(head_commit.id)
    }

    /// Resolve a revision spec (`HEAD~3`, a branch, a full or short hash) to a commit id.
    pub fn resolve(&self, rev: &str) -> Result<ObjectId> {
        let id = self
            .repo
            .rev_parse_single(rev)
            .map_err(|e| StatsError::GitRepo(format!("Invalid revision '{rev}': {e}")))?;

        let commit = id
            .object()?
            .try_into_commit()
            .map_err(|_| StatsError::GitRepo(format!("Not a commit: {rev}")))?;

        Ok(commit.id)
    }

    /// Resolve `rev`, or HEAD when `None`.
    pub fn resolve_start(&self, rev: Option<&str>) -> Result<ObjectId> {
        match rev {
            Some(rev) => self.resolve(rev),
            None => self.head_id(),
        }
    }

    pub fn walk(&self, start: ObjectId, options: WalkOptions) -> HistoryWalk<'_> {
        HistoryWalk::new(self, start, options)
    }

    pub fn read_commit(&self, commit_id: ObjectId) -> Result<Commit> {
        let commit = self.repo.find_commit(commit_id)?;
        let author = commit.author()?;
        let time = author
            .time()
            .map_err(|e| StatsError::InvalidDate(format!("Unparsable author time in {commit_id}: {e}")))?;
        let timestamp = to_datetime(time.seconds, time.offset)?;

        Ok(Commit {
            id: commit_id.to_string(),
            author_name: author.name.to_string(),
            author_email: author.email.to_string(),
            timestamp,
            parent_ids: commit.parent_ids().map(|id| id.detach().to_string()).collect(),
        })
    }

    /// Per-file line deltas from `parent_id`'s tree to `commit_id`'s tree.
    pub fn diff_against_parent(&self, commit_id: &str, parent_id: &str) -> Result<Vec<FileChange>> {
        let commit_tree = self.repo.find_commit(parse_id(commit_id)?)?.tree()?;
        let parent_tree = self.repo.find_commit(parse_id(parent_id)?)?.tree()?;

        let changes: Vec<ChangeDetached> =
            self.repo.diff_tree_to_tree(Some(&parent_tree), Some(&commit_tree), None)?;

        let mut files = Vec::new();
        for change in changes {
            self.handle_change(change, &mut files);
        }
        Ok(files)
    }

    /// Every file in a root commit's tree, each counted as a pure addition of
    /// its newline-separated segments.
    pub fn root_files(&self, commit_id: &str) -> Result<Vec<FileChange>> {
        let commit_tree = self.repo.find_commit(parse_id(commit_id)?)?.tree()?;
        let changes: Vec<ChangeDetached> = self.repo.diff_tree_to_tree(None, Some(&commit_tree), None)?;

        let mut files = Vec::new();
        for change in changes {
            if let ChangeDetached::Addition {
                id,
                location,
                entry_mode,
                ..
            } = change
            {
                if !is_file(entry_mode) {
                    continue;
                }
                let path = location.to_string();
                match self.read_text(id) {
                    Some(text) => files.push(FileChange::new(path, count_segments(&text), 0)),
                    // Binary root files do not count the commit on their own.
                    None => files.push(FileChange::unreadable(path)),
                }
            }
        }
        Ok(files)
    }

    fn handle_change(&self, change: ChangeDetached, files: &mut Vec<FileChange>) {
        match change {
            ChangeDetached::Addition {
                id,
                location,
                entry_mode,
                ..
            } => {
                if is_file(entry_mode) {
                    files.push(self.line_delta(location.to_string(), None, Some(id)));
                }
            }
            ChangeDetached::Deletion {
                id,
                location,
                entry_mode,
                ..
            } => {
                if is_file(entry_mode) {
                    files.push(self.line_delta(location.to_string(), Some(id), None));
                }
            }
            ChangeDetached::Modification {
                previous_id,
                previous_entry_mode,
                id,
                entry_mode,
                location,
                ..
            } => {
                let path = location.to_string();
                match (is_file(previous_entry_mode), is_file(entry_mode)) {
                    (true, true) => files.push(self.line_delta(path, Some(previous_id), Some(id))),
                    (true, false) => files.push(self.line_delta(path, Some(previous_id), None)),
                    (false, true) => files.push(self.line_delta(path, None, Some(id))),
                    (false, false) => {}
                }
            }
            ChangeDetached::Rewrite {
                source_id,
                source_entry_mode,
                id,
                entry_mode,
                source_location,
                location,
                copy,
                ..
            } => {
                // Report rewrites as the plain delete/add pair a patch without
                // rename detection would show.
                if !copy && is_file(source_entry_mode) {
                    files.push(self.line_delta(source_location.to_string(), Some(source_id), None));
                }
                if is_file(entry_mode) {
                    files.push(self.line_delta(location.to_string(), None, Some(id)));
                }
            }
        }
    }

    fn line_delta(&self, path: String, old: Option<ObjectId>, new: Option<ObjectId>) -> FileChange {
        let old_text = match old {
            Some(id) => self.read_text(id),
            None => Some(String::new()),
        };
        let new_text = match new {
            Some(id) => self.read_text(id),
            None => Some(String::new()),
        };

        match (old_text, new_text) {
            (Some(old_text), Some(new_text)) => {
                let (added, deleted) = line_diff(&old_text, &new_text);
                FileChange::new(path, added, deleted)
            }
            _ => FileChange::unreadable(path),
        }
    }

    /// Blob content as text, or `None` if it is missing, binary or not UTF-8.
    fn read_text(&self, id: ObjectId) -> Option<String> {
        let object = self.repo.find_object(id).ok()?;
        if is_binary(object.data.as_slice()) {
            return None;
        }
        String::from_utf8(object.data.clone()).ok()
    }
}

fn parse_id(hex: &str) -> Result<ObjectId> {
    ObjectId::from_hex(hex.as_bytes())
        .map_err(|e| StatsError::GitRepo(format!("Invalid commit ID '{hex}': {e}")))
}

fn to_datetime(seconds: i64, offset: i32) -> Result<DateTime<FixedOffset>> {
    let tz = FixedOffset::east_opt(offset)
        .ok_or_else(|| StatsError::InvalidDate(format!("Invalid UTC offset: {offset}")))?;
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&tz))
        .ok_or_else(|| StatsError::InvalidDate(format!("Invalid timestamp: {seconds}")))
}

fn is_file(mode: EntryMode) -> bool {
    !mode.is_tree() && !mode.is_commit()
}

fn is_binary(data: &[u8]) -> bool {
    data.iter().take(8192).any(|&b| b == 0)
}

/// Segments delimited by `\n`; a trailing newline yields a final empty segment.
pub fn count_segments(text: &str) -> u64 {
    text.split('\n').count() as u64
}

/// Added and deleted line counts of a line-level diff.
pub fn line_diff(old: &str, new: &str) -> (u64, u64) {
    let diff = TextDiff::from_lines(old, new);
    let mut added = 0u64;
    let mut deleted = 0u64;
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => deleted += 1,
            ChangeTag::Equal => {}
        }
    }
    (added, deleted)
}
