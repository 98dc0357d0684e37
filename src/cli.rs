// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// simcommit - find prior commits that touched the same lines
///
/// Diffs a change with zero context, traces the history of every modified
/// line range, and ranks earlier commits by how much of them overlapped.
#[derive(Parser, Debug)]
#[command(name = "simcommit")]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  simcommit search --staged\n  simcommit search --from HEAD~1 --to HEAD -p 5\n  simcommit exemplars --from 3f2a91c -n 3"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Repository to search (defaults to current directory)
    #[arg(short = 'C', long = "repo", global = true)]
    pub repo: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Which change to search for and how wide to look
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Revision the change starts from (default: HEAD)
    #[arg(short = 'f', long)]
    pub from: Option<String>,

    /// Revision the change ends at
    #[arg(short = 't', long, conflicts_with = "staged")]
    pub to: Option<String>,

    /// Search for staged changes (implied when neither --from nor --to is given)
    #[arg(short = 's', long)]
    pub staged: bool,

    /// Lines of padding around each deletion when tracing history
    #[arg(short = 'p', long)]
    pub padding: Option<usize>,

    /// Number of concurrent history queries
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,
}

impl SelectionArgs {
    /// Staged mode unless a revision was named
    pub fn only_staged(&self) -> bool {
        self.staged || (self.from.is_none() && self.to.is_none())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank prior commits that modified the same lines
    #[command(visible_alias = "s")]
    Search {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Maximum number of results
        #[arg(short = 'm', long = "limit", visible_alias = "max-results")]
        limit: Option<usize>,
    },

    /// Print messages of the best-ranked commits for few-shot prompting
    #[command(visible_alias = "x")]
    Exemplars {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Number of exemplar messages
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
