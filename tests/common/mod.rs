#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

pub fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

/// Throwaway repository driven through the git CLI with pinned dates.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn init() -> Self {
        let dir = tempdir().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "-q"]);
        repo.git(&["checkout", "-q", "-b", "trunk"]);
        repo.git(&["config", "core.autocrlf", "false"]);
        repo.git(&["config", "core.safecrlf", "false"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo.git(&["config", "user.email", "you@example.com"]);
        repo.git(&["config", "user.name", "Your Name"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    pub fn rev_parse(&self, rev: &str) -> String {
        let out = Command::new("git")
            .args(["rev-parse", rev])
            .current_dir(self.path())
            .output()
            .unwrap();
        assert!(out.status.success(), "rev-parse {rev} failed");
        String::from_utf8(out.stdout).unwrap().trim().to_string()
    }

    /// Delete a loose object to simulate a damaged repository.
    pub fn remove_object(&self, id: &str) {
        let path = self.path().join(".git/objects").join(&id[..2]).join(&id[2..]);
        fs::remove_file(path).unwrap();
    }

    pub fn write(&self, name: &str, content: &[u8]) {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Stage everything and commit as `author` at `date` (RFC 2822 or ISO 8601).
    pub fn commit_as(&self, author: &str, email: &str, date: &str, message: &str) {
        self.git(&["add", "-A"]);
        let status = Command::new("git")
            .args(["commit", "-q", "--allow-empty", "-m", message])
            .env("GIT_AUTHOR_NAME", author)
            .env("GIT_AUTHOR_EMAIL", email)
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_NAME", author)
            .env("GIT_COMMITTER_EMAIL", email)
            .env("GIT_COMMITTER_DATE", date)
            .current_dir(self.path())
            .status()
            .unwrap();
        assert!(status.success(), "commit '{message}' failed");
    }

    pub fn commit_file(&self, author: &str, date: &str, name: &str, content: &str) {
        self.write(name, content.as_bytes());
        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        self.commit_as(author, &email, date, &format!("update {name}"));
    }

    pub fn merge(&self, branch: &str, date: &str) {
        let status = Command::new("git")
            .args(["merge", "-q", "--no-ff", branch, "-m", &format!("merge {branch}")])
            .env("GIT_AUTHOR_NAME", "Merger")
            .env("GIT_AUTHOR_EMAIL", "merger@example.com")
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_NAME", "Merger")
            .env("GIT_COMMITTER_EMAIL", "merger@example.com")
            .env("GIT_COMMITTER_DATE", date)
            .current_dir(self.path())
            .status()
            .unwrap();
        assert!(status.success(), "merge {branch} failed");
    }
}
