// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-history log parsing
//!
//! A line-history response is a sequence of records, one per commit:
//!
//! ```text
//! commit <hash>
//! [Merge: <parents>]
//! Author: <name> <email>
//! Date:   <timestamp>
//!
//!     <message lines>
//!
//! diff --git a/<path> b/<path>
//! --- a/<path>
//! +++ b/<path>
//! @@ -a,b +c,d @@
//! <payload>
//! ```

use std::sync::Arc;

use tracing::warn;

use crate::engine::cache::{Commit, CommitCache, CommitHeader};
use crate::errors::{Result, SearchError};
use crate::git::HistoryBackend;

const COMMIT_MARKER: &str = "commit ";
const DIFF_MARKER: &str = "diff --git";
const HUNK_MARKER: &str = "@@";

/// Trailer prefixes dropped from exemplar messages
pub const DEFAULT_TRAILERS: &[&str] = &[
    "Resolves",
    "Signed-off-by",
    "Co-authored-by",
    "Reviewed-by",
    "Acked-by",
    "Tested-by",
    "Change-Id",
];

/// How much of one commit a single history query overlapped
#[derive(Debug, Clone)]
pub struct CommitOverlap {
    pub commit: Arc<Commit>,
    pub insertions: usize,
    pub deletions: usize,
}

impl CommitOverlap {
    pub fn size(&self) -> usize {
        self.insertions + self.deletions
    }
}

/// Case-insensitive blacklist of message line prefixes
#[derive(Debug, Clone)]
pub struct TrailerFilter {
    prefixes: Vec<String>,
}

impl Default for TrailerFilter {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<String>())
    }
}

impl TrailerFilter {
    /// Default trailers plus `extra` prefixes
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut prefixes: Vec<String> = DEFAULT_TRAILERS
            .iter()
            .map(|p| p.to_lowercase())
            .collect();
        for prefix in extra {
            let prefix = prefix.as_ref().trim().to_lowercase();
            if !prefix.is_empty() && !prefixes.contains(&prefix) {
                prefixes.push(prefix);
            }
        }
        Self { prefixes }
    }

    pub fn is_trailer(&self, line: &str) -> bool {
        let line = line.trim_start().to_lowercase();
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
    }
}

/// One parsed record before the commit is resolved through the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub header: CommitHeader,
    /// Inserted lines shown for the queried range only
    pub insertions: usize,
    /// Deleted lines shown for the queried range only
    pub deletions: usize,
}

/// Split raw history text into per-commit segments
pub fn split_log(text: &str) -> Vec<Vec<&str>> {
    let mut segments: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        if line.starts_with(COMMIT_MARKER) {
            segments.push(Vec::new());
        }
        if let Some(segment) = segments.last_mut() {
            segment.push(line);
        }
    }
    segments
}

/// Parse one commit segment produced by [`split_log`]
pub fn parse_log_record(lines: &[&str], trailers: &TrailerFilter) -> Result<LogRecord> {
    let malformed = |reason: &str| SearchError::MalformedLogRecord {
        reason: reason.to_string(),
    };

    if lines.len() < 3 {
        return Err(malformed("fewer than 3 metadata lines"));
    }

    let hash = lines[0]
        .strip_prefix(COMMIT_MARKER)
        .and_then(|rest| rest.split_whitespace().next())
        .ok_or_else(|| malformed("missing commit identity"))?
        .to_string();

    let header_end = lines
        .iter()
        .skip(1)
        .position(|line| line.trim().is_empty() || line.starts_with(DIFF_MARKER))
        .map(|pos| pos + 1)
        .unwrap_or(lines.len());
    let metadata = &lines[1..header_end];

    let author = metadata_value(metadata, "Author:")
        .ok_or_else(|| malformed(&format!("commit {} has no author line", hash)))?;
    let date = metadata_value(metadata, "Date:")
        .ok_or_else(|| malformed(&format!("commit {} has no date line", hash)))?;

    let mut message_parts: Vec<&str> = Vec::new();
    let mut insertions = 0;
    let mut deletions = 0;
    let mut in_payload = false;
    let mut in_hunk = false;

    for line in &lines[header_end..] {
        if line.starts_with(DIFF_MARKER) {
            in_payload = true;
            in_hunk = false;
            continue;
        }

        if !in_payload {
            let text = line.trim();
            if !text.is_empty() && !trailers.is_trailer(text) {
                message_parts.push(text);
            }
            continue;
        }

        if line.starts_with(HUNK_MARKER) {
            in_hunk = true;
        } else if in_hunk {
            if line.starts_with('-') {
                deletions += 1;
            } else if line.starts_with('+') {
                insertions += 1;
            }
        }
    }

    Ok(LogRecord {
        header: CommitHeader {
            hash,
            author,
            date,
            message: message_parts.join(" ").trim().to_string(),
        },
        insertions,
        deletions,
    })
}

fn metadata_value(metadata: &[&str], key: &str) -> Option<String> {
    metadata
        .iter()
        .find_map(|line| line.strip_prefix(key))
        .map(|value| value.trim().to_string())
}

/// Parse a line-history response into overlaps, resolving commits via `cache`
///
/// Malformed records are logged and skipped. Backend failures while
/// fetching commit totals abort the parse.
pub fn parse_history<B>(
    text: &str,
    cache: &CommitCache,
    backend: &B,
    trailers: &TrailerFilter,
) -> Result<Vec<CommitOverlap>>
where
    B: HistoryBackend + ?Sized,
{
    let mut overlaps = Vec::new();

    for segment in split_log(text) {
        let record = match parse_log_record(&segment, trailers) {
            Ok(record) => record,
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "skipping log record");
                continue;
            }
            Err(err) => return Err(err),
        };

        let commit = cache.get_or_create(backend, record.header)?;
        overlaps.push(CommitOverlap {
            commit,
            insertions: record.insertions,
            deletions: record.deletions,
        });
    }

    Ok(overlaps)
}
