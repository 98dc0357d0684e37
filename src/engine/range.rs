// SPDX-License-Identifier: MIT OR Apache-2.0

//! 1-indexed line range arithmetic

use serde::Serialize;
use std::fmt;

use crate::errors::{Result, SearchError};

/// Padding applied around deleted lines when querying history
pub const DEFAULT_PADDING: usize = 3;

/// A contiguous span of `length` lines starting at `line` (1-indexed)
///
/// A zero-length range marks a pure insertion point with no deleted lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    line: usize,
    length: usize,
}

impl Range {
    pub fn new(line: usize, length: usize) -> Result<Self> {
        if line == 0 {
            return Err(SearchError::MalformedRange {
                token: format!("{},{}", line, length),
                reason: "line numbers start at 1".to_string(),
            });
        }
        if line.checked_add(length).is_none() {
            return Err(SearchError::MalformedRange {
                token: format!("{},{}", line, length),
                reason: "range end overflows".to_string(),
            });
        }
        Ok(Self { line, length })
    }

    /// Empty range anchored at the top of a file
    pub fn empty() -> Self {
        Self { line: 1, length: 0 }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Last line covered, or `None` for an empty range
    pub fn last_line(&self) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(self.line + self.length - 1)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Inclusive `start,end` form accepted by `git log -L`
    pub fn git_spec(&self) -> String {
        let end = self.last_line().unwrap_or(self.line);
        format!("{},{}", self.line, end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.line, self.length)
    }
}

/// Parse a range token of the form `<line>[,<length>]`
///
/// Leading `-`/`+` sign markers are stripped. An absent length means 1.
pub fn parse_range(token: &str) -> Result<Range> {
    let malformed = |reason: &str| SearchError::MalformedRange {
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let body = token.trim().trim_start_matches(['-', '+']);
    let (line_text, length_text) = match body.split_once(',') {
        Some((line, length)) => (line, Some(length)),
        None => (body, None),
    };

    let line = line_text
        .parse::<usize>()
        .map_err(|_| malformed("line is not a positive integer"))?;
    if line == 0 {
        return Err(malformed("line is not a positive integer"));
    }

    let length = match length_text {
        Some(text) => text
            .parse::<usize>()
            .map_err(|_| malformed("length is not a non-negative integer"))?,
        None => 1,
    };

    Range::new(line, length)
}

/// Expand `deletions` by `padding` lines on each side, clipped to `[1, max_lines]`
///
/// An empty file yields an empty range.
pub fn compute_query_range(deletions: Range, padding: usize, max_lines: usize) -> Range {
    if max_lines == 0 {
        return Range::empty();
    }

    let first = deletions.line.saturating_sub(padding).max(1).min(max_lines);
    let last = deletions
        .last_line()
        .unwrap_or(deletions.line)
        .saturating_add(padding)
        .min(max_lines);

    Range {
        line: first,
        length: last.saturating_sub(first) + 1,
    }
}
