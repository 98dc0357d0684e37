// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the similar-commit search engine
//!
//! Parsing errors are recoverable by skipping the offending unit; backend
//! failures are surfaced to the caller unchanged.

use thiserror::Error;

/// Errors produced while searching commit history
#[derive(Debug, Error)]
pub enum SearchError {
    /// A range token such as `10,3` could not be parsed
    #[error("malformed range token '{token}': {reason}")]
    MalformedRange { token: String, reason: String },

    /// A hunk header is missing one of its two range tokens
    #[error("malformed hunk header in '{file}': '{header}'")]
    MalformedHunk { file: String, header: String },

    /// A line-history record lacks its identity or metadata lines
    #[error("malformed log record: {reason}")]
    MalformedLogRecord { reason: String },

    /// Staged mode and an explicit target revision were both requested
    #[error(
        "cannot compare staged changes and a target revision at the same time\n\n\
         Suggestion: drop --staged to compare two revisions, or drop --to to search staged changes."
    )]
    InvalidSearchMode,

    /// The backend ran but reported failure
    #[error("{command} failed: {stderr}")]
    Backend { command: String, stderr: String },

    /// The backend could not be started at all
    #[error("failed to run {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// No `git` executable on PATH
    #[error(
        "git executable not found\n\n\
         Suggestion: install git and make sure it is on PATH."
    )]
    GitNotFound,

    /// The fixed-width query pool could not be created
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl SearchError {
    /// Parsing-layer errors that the engine recovers from by skipping a unit
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SearchError::MalformedRange { .. }
                | SearchError::MalformedHunk { .. }
                | SearchError::MalformedLogRecord { .. }
        )
    }
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;
