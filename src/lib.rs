// SPDX-License-Identifier: MIT OR Apache-2.0

//! simcommit - similar-commit search library
//!
//! Finds prior commits whose changes overlapped the lines touched by a
//! pending or historical change, and ranks them by how much of each commit
//! overlapped.

pub mod config;
pub mod engine;
pub mod errors;
pub mod git;
pub mod output;
