// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for simcommit
//!
//! Loads configuration from .simcommitrc.toml in current directory or ~/.config/simcommit/config.toml

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::engine::log::TrailerFilter;
use crate::engine::range::DEFAULT_PADDING;
use crate::engine::search::{SearchOptions, DEFAULT_WORKERS};

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Configuration loaded from .simcommitrc.toml or ~/.config/simcommit/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lines of padding around each deletion when querying history
    pub padding: Option<usize>,
    /// Concurrent history queries
    pub workers: Option<usize>,
    /// Maximum number of ranked commits to print
    pub max_results: Option<usize>,
    /// Number of exemplar messages to select
    pub exemplars: Option<usize>,
    /// Default output format (text or json)
    pub default_format: Option<String>,
    /// Message line prefixes to drop in addition to the built-in trailers
    pub extra_trailers: Vec<String>,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .simcommitrc.toml in current directory
    /// 2. ~/.config/simcommit/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(&PathBuf::from(".simcommitrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("simcommit").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format.as_ref().and_then(|s| match s.to_lowercase().as_str() {
            "json" => Some(ConfigOutputFormat::Json),
            "text" => Some(ConfigOutputFormat::Text),
            _ => None,
        })
    }

    /// Merge CLI options with config (CLI wins)
    pub fn merge_max_results(&self, cli_value: Option<usize>) -> usize {
        cli_value.or(self.max_results).unwrap_or(10)
    }

    pub fn merge_exemplars(&self, cli_value: Option<usize>) -> usize {
        cli_value.or(self.exemplars).unwrap_or(3)
    }

    /// Build search options, letting CLI values override the file
    pub fn search_options(&self, padding: Option<usize>, workers: Option<usize>) -> SearchOptions {
        SearchOptions {
            padding: padding.or(self.padding).unwrap_or(DEFAULT_PADDING),
            workers: workers.or(self.workers).unwrap_or(DEFAULT_WORKERS),
            trailers: TrailerFilter::with_extra(&self.extra_trailers),
        }
    }
}
