// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session memoization of full commit metadata.

use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::errors::{Result, SearchError};
use crate::git::HistoryBackend;

/// A historical commit with its full-commit change totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: String,
    pub author: String,
    /// Backend-native timestamp text
    pub date: String,
    pub message: String,
    pub insertions: usize,
    pub deletions: usize,
}

impl Commit {
    pub fn size(&self) -> usize {
        self.insertions + self.deletions
    }

    pub fn short_hash(&self) -> &str {
        let end = self
            .hash
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.hash.len());
        &self.hash[..end]
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) by {}", self.short_hash(), self.message, self.author)
    }
}

/// Identity fields read from a line-history record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitHeader {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub message: String,
}

/// Commits keyed by full hash, created at most once each
///
/// The first caller for a hash fetches totals from the backend; concurrent
/// callers for the same hash wait on that fetch and share its result.
#[derive(Debug, Default)]
pub struct CommitCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Arc<Commit>>>>>,
}

impl CommitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached commit for `header.hash`, creating it on first sight
    ///
    /// Header fields passed after the first insertion are ignored. A failed
    /// stats query leaves the slot empty so a later call may retry.
    pub fn get_or_create<B>(&self, backend: &B, header: CommitHeader) -> Result<Arc<Commit>>
    where
        B: HistoryBackend + ?Sized,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(entries.entry(header.hash.clone()).or_default())
        };

        cell.get_or_try_init(|| {
            let stats = backend.commit_stats(&header.hash)?;
            Ok::<_, SearchError>(Arc::new(Commit {
                hash: header.hash,
                author: header.author,
                date: header.date,
                message: header.message,
                insertions: stats.insertions,
                deletions: stats.deletions,
            }))
        })
        .cloned()
    }

    pub fn get(&self, hash: &str) -> Option<Arc<Commit>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(hash).and_then(|cell| cell.get().cloned())
    }

    /// Number of commits fully created
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::range::Range;
    use crate::git::{CommitStats, Comparison};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingBackend {
        stats_calls: AtomicUsize,
        fail: bool,
    }

    impl HistoryBackend for CountingBackend {
        fn diff(&self, _comparison: &Comparison) -> Result<String> {
            Ok(String::new())
        }

        fn line_history(&self, _path: &str, _range: Range, _until: &str) -> Result<String> {
            Ok(String::new())
        }

        fn commit_stats(&self, hash: &str) -> Result<CommitStats> {
            self.stats_calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            if self.fail {
                return Err(SearchError::Backend {
                    command: "git show".into(),
                    stderr: format!("bad object {hash}"),
                });
            }
            Ok(CommitStats {
                insertions: 6,
                deletions: 4,
            })
        }

        fn line_count(&self, _rev: &str, _path: &str) -> Result<usize> {
            Ok(0)
        }
    }

    fn header(hash: &str, author: &str) -> CommitHeader {
        CommitHeader {
            hash: hash.to_string(),
            author: author.to_string(),
            date: "2024-01-01 00:00:00 +0000".to_string(),
            message: "Fix parser".to_string(),
        }
    }

    #[test]
    fn first_insertion_wins_and_stats_fetched_once() {
        let backend = CountingBackend::default();
        let cache = CommitCache::new();

        let first = cache.get_or_create(&backend, header("abc123", "alice")).unwrap();
        let second = cache.get_or_create(&backend, header("abc123", "bob")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.author, "alice");
        assert_eq!(second.size(), 10);
        assert_eq!(backend.stats_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_callers_share_one_commit() {
        let backend = CountingBackend::default();
        let cache = CommitCache::new();

        let commits: Vec<Arc<Commit>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let backend = &backend;
                    let cache = &cache;
                    s.spawn(move || {
                        cache
                            .get_or_create(backend, header("feed", &format!("author-{i}")))
                            .expect("create")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().expect("join")).collect()
        });

        assert_eq!(backend.stats_calls.load(Ordering::SeqCst), 1);
        assert!(commits.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn failed_fetch_is_not_cached() {
        let backend = CountingBackend {
            fail: true,
            ..Default::default()
        };
        let cache = CommitCache::new();

        assert!(cache.get_or_create(&backend, header("dead", "x")).is_err());
        assert!(cache.get("dead").is_none());
        assert!(cache.is_empty());
        assert!(cache.get_or_create(&backend, header("dead", "x")).is_err());
        assert_eq!(backend.stats_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn clear_drops_all_entries() {
        let backend = CountingBackend::default();
        let cache = CommitCache::new();
        cache.get_or_create(&backend, header("a1", "x")).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.get_or_create(&backend, header("a1", "x")).unwrap();
        assert_eq!(backend.stats_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn short_hash_truncates_to_seven() {
        let commit = Commit {
            hash: "0123456789abcdef".into(),
            author: "a".into(),
            date: String::new(),
            message: "m".into(),
            insertions: 1,
            deletions: 0,
        };
        assert_eq!(commit.short_hash(), "0123456");
        assert_eq!(commit.to_string(), "0123456 (m) by a");
    }
}
