// SPDX-License-Identifier: MIT OR Apache-2.0

//! Overlap aggregation and ranking

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::cache::Commit;
use crate::engine::log::CommitOverlap;

/// A ranked commit; `score` is the share of the commit's change that overlapped
#[derive(Debug, Clone)]
pub struct CommitScore {
    pub commit: Arc<Commit>,
    pub score: f64,
    /// Overlapping lines summed over every query
    pub overlap: usize,
}

/// Flattened row for JSON output
#[derive(Debug, Serialize)]
pub struct ScoreRow<'a> {
    pub hash: &'a str,
    pub score: f64,
    pub overlap: usize,
    pub size: usize,
    pub author: &'a str,
    pub date: &'a str,
    pub message: &'a str,
}

impl CommitScore {
    pub fn row(&self) -> ScoreRow<'_> {
        ScoreRow {
            hash: &self.commit.hash,
            score: self.score,
            overlap: self.overlap,
            size: self.commit.size(),
            author: &self.commit.author,
            date: &self.commit.date,
            message: &self.commit.message,
        }
    }
}

/// Fold overlaps into one score per commit, best first
///
/// Commits with zero size or zero overlap are dropped. Equal scores keep the
/// order in which their commits were first seen.
pub fn aggregate(overlaps: &[CommitOverlap]) -> Vec<CommitScore> {
    let mut order: Vec<(Arc<Commit>, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for overlap in overlaps {
        let slot = *index.entry(overlap.commit.hash.as_str()).or_insert_with(|| {
            order.push((Arc::clone(&overlap.commit), 0));
            order.len() - 1
        });
        order[slot].1 += overlap.size();
    }

    let mut scores: Vec<CommitScore> = order
        .into_iter()
        .filter(|(commit, overlap)| commit.size() > 0 && *overlap > 0)
        .map(|(commit, overlap)| CommitScore {
            score: overlap as f64 / commit.size() as f64,
            commit,
            overlap,
        })
        .collect();

    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Messages of the best `count` commits for few-shot prompting
///
/// Empty and repeated messages are skipped so each exemplar is distinct.
pub fn exemplar_messages(scores: &[CommitScore], count: usize) -> Vec<String> {
    let mut messages: Vec<String> = Vec::new();
    for score in scores {
        if messages.len() >= count {
            break;
        }
        let message = score.commit.message.trim();
        if message.is_empty() || messages.iter().any(|m| m == message) {
            continue;
        }
        messages.push(message.to_string());
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(hash: &str, message: &str, insertions: usize, deletions: usize) -> Arc<Commit> {
        Arc::new(Commit {
            hash: hash.to_string(),
            author: "dev".to_string(),
            date: "2024-01-01".to_string(),
            message: message.to_string(),
            insertions,
            deletions,
        })
    }

    fn overlap(commit: &Arc<Commit>, insertions: usize, deletions: usize) -> CommitOverlap {
        CommitOverlap {
            commit: Arc::clone(commit),
            insertions,
            deletions,
        }
    }

    #[test]
    fn overlaps_for_same_commit_are_combined() {
        let abc = commit("abc123", "Fix", 6, 4);
        let scores = aggregate(&[overlap(&abc, 2, 1), overlap(&abc, 0, 4)]);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].overlap, 7);
        assert!((scores[0].score - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn ranks_by_normalized_overlap() {
        let big = commit("big", "Rewrite module", 90, 10);
        let small = commit("small", "Tweak constant", 1, 1);
        let scores = aggregate(&[overlap(&big, 10, 10), overlap(&small, 1, 1)]);

        let hashes: Vec<&str> = scores.iter().map(|s| s.commit.hash.as_str()).collect();
        assert_eq!(hashes, vec!["small", "big"]);
        assert!((scores[1].score - 0.2).abs() < 1e-9);
    }

    #[test]
    fn empty_commits_and_zero_overlap_are_excluded() {
        let merge = commit("merge", "Merge branch", 0, 0);
        let touched = commit("touched", "Touch", 3, 0);
        let context_only = commit("ctx", "Context", 5, 5);
        let scores = aggregate(&[
            overlap(&merge, 2, 0),
            overlap(&touched, 1, 0),
            overlap(&context_only, 0, 0),
        ]);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].commit.hash, "touched");
        assert!(scores.iter().all(|s| s.score > 0.0 && s.score.is_finite()));
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let a = commit("a", "A", 2, 0);
        let b = commit("b", "B", 4, 0);
        let c = commit("c", "C", 1, 0);
        let scores = aggregate(&[overlap(&b, 2, 0), overlap(&a, 1, 0), overlap(&c, 1, 0)]);

        let hashes: Vec<&str> = scores.iter().map(|s| s.commit.hash.as_str()).collect();
        assert_eq!(hashes, vec!["c", "b", "a"]);
    }

    #[test]
    fn no_overlaps_is_an_empty_ranking() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn exemplars_skip_empty_and_duplicate_messages() {
        let first = commit("1", "Fix retry", 1, 0);
        let blank = commit("2", "", 1, 0);
        let dup = commit("3", "Fix retry", 2, 0);
        let other = commit("4", "Add timeout", 4, 0);
        let last = commit("5", "Docs", 8, 0);
        let scores = aggregate(&[
            overlap(&first, 1, 0),
            overlap(&blank, 1, 0),
            overlap(&dup, 2, 0),
            overlap(&other, 2, 0),
            overlap(&last, 1, 0),
        ]);

        assert_eq!(exemplar_messages(&scores, 2), vec!["Fix retry", "Add timeout"]);
        assert_eq!(exemplar_messages(&scores, 10).len(), 3);
        assert!(exemplar_messages(&scores, 0).is_empty());
    }
}
