// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result rendering for the command line

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::engine::score::{CommitScore, ScoreRow};

/// Print a value as JSON, pretty unless `compact`
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// JSON rows for the first `limit` scores
pub fn score_rows(scores: &[CommitScore], limit: usize) -> Vec<ScoreRow<'_>> {
    scores.iter().take(limit).map(CommitScore::row).collect()
}

pub fn print_scores_text(scores: &[CommitScore], limit: usize) {
    if scores.is_empty() {
        println!("{} No similar commits found", "✗".red());
        return;
    }

    println!();
    for score in scores.iter().take(limit) {
        let commit = &score.commit;
        println!(
            "  {} {} {} {}",
            commit.short_hash().yellow(),
            format!("{:.3}", score.score).green(),
            format!("[{}/{}]", score.overlap, commit.size()).blue(),
            commit.message
        );
        println!("          {} {}", commit.author.cyan(), commit.date.dimmed());
    }

    let shown = scores.len().min(limit);
    println!(
        "\n{} Found {} similar commits{}",
        "✓".green(),
        scores.len().to_string().cyan(),
        if shown < scores.len() {
            format!(" (showing {})", shown)
        } else {
            String::new()
        }
    );
}

pub fn print_exemplars_text(messages: &[String]) {
    if messages.is_empty() {
        println!("{} No exemplar messages found", "✗".red());
        return;
    }
    for (i, message) in messages.iter().enumerate() {
        println!("{}. {}", i + 1, message);
    }
}
