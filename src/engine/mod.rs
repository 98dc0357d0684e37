// SPDX-License-Identifier: MIT OR Apache-2.0

//! Similar-commit search engine

pub mod cache;
pub mod diff;
pub mod log;
pub mod range;
pub mod score;
pub mod search;

pub use cache::{Commit, CommitCache};
pub use log::{CommitOverlap, TrailerFilter};
pub use range::Range;
pub use score::{exemplar_messages, CommitScore};
pub use search::{SearchOptions, SearchSession};
