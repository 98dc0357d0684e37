// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search orchestration: diff → change blocks → history queries → ranking.

use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

use crate::engine::cache::CommitCache;
use crate::engine::diff::{parse_diff, ChangeBlock};
use crate::engine::log::{parse_history, CommitOverlap, TrailerFilter};
use crate::engine::range::{compute_query_range, DEFAULT_PADDING};
use crate::engine::score::{aggregate, CommitScore};
use crate::errors::{Result, SearchError};
use crate::git::{Comparison, HistoryBackend};

/// Default width of the history query pool
pub const DEFAULT_WORKERS: usize = 4;

/// Tunables for a search session
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Lines added on each side of a deletion before querying history
    pub padding: usize,
    /// Concurrent backend queries
    pub workers: usize,
    pub trailers: TrailerFilter,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            workers: DEFAULT_WORKERS,
            trailers: TrailerFilter::default(),
        }
    }
}

/// Resolve the public search arguments into a comparison
///
/// `diff_from` defaults to `HEAD`. Without `diff_to` and outside staged mode
/// the comparison is `diff_from` against its parent.
pub fn resolve_comparison(
    diff_from: Option<&str>,
    diff_to: Option<&str>,
    only_staged: bool,
) -> Result<Comparison> {
    let from = diff_from.unwrap_or("HEAD").to_string();
    match (only_staged, diff_to) {
        (true, Some(_)) => Err(SearchError::InvalidSearchMode),
        (true, None) => Ok(Comparison::Staged { base: from }),
        (false, Some(to)) => Ok(Comparison::Revisions {
            from,
            to: to.to_string(),
        }),
        (false, None) => Ok(Comparison::Commit { rev: from }),
    }
}

/// A search session: one backend, one commit cache, one worker pool
///
/// Searches on the same session share the cache; start a new session (or
/// call [`SearchSession::clear_cache`]) for an independent run.
pub struct SearchSession<B: HistoryBackend> {
    backend: B,
    cache: CommitCache,
    pool: rayon::ThreadPool,
    options: SearchOptions,
}

impl<B: HistoryBackend> SearchSession<B> {
    pub fn new(backend: B, options: SearchOptions) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers.max(1))
            .thread_name(|i| format!("simcommit-query-{}", i))
            .build()?;

        Ok(Self {
            backend,
            cache: CommitCache::new(),
            pool,
            options,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &CommitCache {
        &self.cache
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Rank prior commits by how much of them overlapped the selected change
    ///
    /// An empty ranking means no similar commits exist; any backend failure
    /// is returned as an error instead.
    pub fn search(
        &self,
        diff_from: Option<&str>,
        diff_to: Option<&str>,
        only_staged: bool,
    ) -> Result<Vec<CommitScore>> {
        let comparison = resolve_comparison(diff_from, diff_to, only_staged)?;
        self.search_comparison(&comparison)
    }

    pub fn search_comparison(&self, comparison: &Comparison) -> Result<Vec<CommitScore>> {
        let started = Instant::now();
        let diff = self.backend.diff(comparison)?;
        let blocks = parse_diff(&diff)?;
        let until = comparison.pre_image();

        // Pure additions have no prior lines to trace.
        let queries: Vec<&ChangeBlock> = blocks
            .iter()
            .filter(|block| !block.deletions.is_empty())
            .collect();
        debug!(
            blocks = blocks.len(),
            queries = queries.len(),
            until = %until,
            "parsed diff"
        );

        let mut files: Vec<&str> = queries.iter().map(|block| block.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();

        let overlaps: Vec<CommitOverlap> = self.pool.install(|| -> Result<Vec<CommitOverlap>> {
            let line_counts: HashMap<&str, usize> = files
                .par_iter()
                .map(|file| Ok((*file, self.backend.line_count(&until, file)?)))
                .collect::<Result<_>>()?;

            let per_block: Vec<Vec<CommitOverlap>> = queries
                .par_iter()
                .map(|block| {
                    let max_lines = line_counts.get(block.file.as_str()).copied().unwrap_or(0);
                    self.overlaps_for_block(block, max_lines, &until)
                })
                .collect::<Result<_>>()?;

            Ok(per_block.into_iter().flatten().collect())
        })?;

        let scores = aggregate(&overlaps);
        info!(
            overlaps = overlaps.len(),
            commits = scores.len(),
            cached = self.cache.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );
        Ok(scores)
    }

    fn overlaps_for_block(
        &self,
        block: &ChangeBlock,
        max_lines: usize,
        until: &str,
    ) -> Result<Vec<CommitOverlap>> {
        let range = compute_query_range(block.deletions, self.options.padding, max_lines);
        if range.is_empty() {
            return Ok(Vec::new());
        }

        debug!(file = %block.file, range = %range.git_spec(), "querying line history");
        let log = self.backend.line_history(&block.file, range, until)?;
        parse_history(&log, &self.cache, &self.backend, &self.options.trailers)
    }
}
