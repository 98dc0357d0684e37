// SPDX-License-Identifier: MIT OR Apache-2.0

//! simcommit - similar-commit search tool
//!
//! Finds earlier commits that modified the same lines as a change and ranks
//! them, e.g. to pick exemplar messages for commit-message generation.

mod cli;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat, SelectionArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use simcommit::config::{Config, ConfigOutputFormat};
use simcommit::engine::{exemplar_messages, CommitScore, SearchSession};
use simcommit::git::GitCli;
use simcommit::output;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    });

    match cli.command {
        Commands::Search { selection, limit } => {
            let scores = run_search(cli.repo.as_deref(), &selection, &config)?;
            let limit = config.merge_max_results(limit);
            match format {
                OutputFormat::Json => {
                    output::print_json(&output::score_rows(&scores, limit), cli.compact)?
                }
                OutputFormat::Text => output::print_scores_text(&scores, limit),
            }
        }
        Commands::Exemplars { selection, count } => {
            let scores = run_search(cli.repo.as_deref(), &selection, &config)?;
            let messages = exemplar_messages(&scores, config.merge_exemplars(count));
            match format {
                OutputFormat::Json => output::print_json(&messages, cli.compact)?,
                OutputFormat::Text => output::print_exemplars_text(&messages),
            }
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "simcommit", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SIMCOMMIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_search(repo: Option<&str>, selection: &SelectionArgs, config: &Config) -> Result<Vec<CommitScore>> {
    let root = match repo {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir()?,
    };
    let backend = GitCli::open(&root)
        .with_context(|| format!("Failed to open git repository at {}", root.display()))?;
    let options = config.search_options(selection.padding, selection.workers);
    let session = SearchSession::new(backend, options)?;

    let scores = session
        .search(
            selection.from.as_deref(),
            selection.to.as_deref(),
            selection.only_staged(),
        )
        .context("Similar-commit search failed")?;
    Ok(scores)
}
