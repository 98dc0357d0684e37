// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version-control backend: the queries the engine issues and a `git` CLI
//! implementation of them.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::engine::range::Range;
use crate::errors::{Result, SearchError};

/// The two endpoints of a search, resolved into a closed set of modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Staged changes in the index against `base`
    Staged { base: String },
    /// Revision `from` against revision `to`
    Revisions { from: String, to: String },
    /// A single historical commit against its first parent
    Commit { rev: String },
}

impl Comparison {
    /// Revision holding the pre-image of the diff; history is walked from here
    pub fn pre_image(&self) -> String {
        match self {
            Comparison::Staged { base } => base.clone(),
            Comparison::Revisions { from, .. } => from.clone(),
            Comparison::Commit { rev } => format!("{}^", rev),
        }
    }
}

/// Full-commit insertion and deletion totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitStats {
    pub insertions: usize,
    pub deletions: usize,
}

/// Textual queries the engine needs from version control
///
/// Every query is a side-effect-free read so implementations must tolerate
/// concurrent calls.
pub trait HistoryBackend: Send + Sync {
    /// Zero-context unified diff for `comparison`, modified files only
    fn diff(&self, comparison: &Comparison) -> Result<String>;

    /// Line-history log for `range` of `path`, walking back from `until`
    fn line_history(&self, path: &str, range: Range, until: &str) -> Result<String>;

    /// Total insertions and deletions of `hash` across all files
    fn commit_stats(&self, hash: &str) -> Result<CommitStats>;

    /// Number of lines of `path` at revision `rev`
    fn line_count(&self, rev: &str, path: &str) -> Result<usize>;
}

/// Backend that runs the `git` executable against a repository
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
}

impl GitCli {
    /// Open `path` as a git work tree, failing early if git is unavailable
    pub fn open(path: &Path) -> Result<Self> {
        which::which("git").map_err(|_| SearchError::GitNotFound)?;
        let cli = Self {
            repo_root: path.to_path_buf(),
        };
        let top = cli.run(&["rev-parse", "--show-toplevel"])?;
        let top = top.trim();
        if top.is_empty() {
            return Err(SearchError::Backend {
                command: "git rev-parse".to_string(),
                stderr: format!("{} is not a git repository", path.display()),
            });
        }
        Ok(Self {
            repo_root: PathBuf::from(top),
        })
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let command = format!("git {}", args.first().copied().unwrap_or_default());
        debug!(?args, "running git");

        // Paths are parsed back out of git output, so keep them unquoted.
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(["-c", "core.quotePath=false"])
            .args(args)
            .output()
            .map_err(|source| SearchError::Io {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SearchError::Backend {
                command,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl HistoryBackend for GitCli {
    fn diff(&self, comparison: &Comparison) -> Result<String> {
        let parent = comparison.pre_image();
        let mut args = vec![
            "diff",
            "--no-color",
            "--no-ext-diff",
            "--src-prefix=a/",
            "--dst-prefix=b/",
            "--unified=0",
            "--diff-filter=M",
        ];
        match comparison {
            Comparison::Staged { base } => {
                args.push("--cached");
                args.push(base.as_str());
            }
            Comparison::Revisions { from, to } => {
                args.push(from.as_str());
                args.push(to.as_str());
            }
            Comparison::Commit { rev } => {
                args.push(parent.as_str());
                args.push(rev.as_str());
            }
        }
        args.push("--");
        self.run(&args)
    }

    fn line_history(&self, path: &str, range: Range, until: &str) -> Result<String> {
        let spec = format!("{}:{}", range.git_spec(), path);
        self.run(&[
            "log",
            "--no-color",
            "--no-decorate",
            "--pretty=medium",
            "--no-abbrev-commit",
            "--no-show-signature",
            "--date=iso",
            "-L",
            spec.as_str(),
            until,
        ])
    }

    fn commit_stats(&self, hash: &str) -> Result<CommitStats> {
        let numstat = self.run(&["show", "--numstat", "--format=", hash])?;
        Ok(parse_numstat(&numstat))
    }

    fn line_count(&self, rev: &str, path: &str) -> Result<usize> {
        let object = format!("{}:{}", rev, path);
        let blob = self.run(&["show", object.as_str()])?;
        Ok(blob.lines().count())
    }
}

/// Sum `git show --numstat` rows; binary files (`-`) count as zero
pub fn parse_numstat(text: &str) -> CommitStats {
    let mut stats = CommitStats::default();
    for line in text.lines() {
        let mut cols = line.split('\t');
        let (Some(ins), Some(del), Some(_path)) = (cols.next(), cols.next(), cols.next()) else {
            continue;
        };
        stats.insertions += ins.parse::<usize>().unwrap_or(0);
        stats.deletions += del.parse::<usize>().unwrap_or(0);
    }
    stats
}
