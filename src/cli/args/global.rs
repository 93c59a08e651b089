//! Global CLI options shared across all commands
//!
//! This module provides a centralized struct for global CLI options, so
//! handlers take one argument instead of every flag separately.

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// For most options, the precedence is: CLI flag > environment variable > config file > default.
/// This struct captures the CLI/env layer; config file defaults are resolved later in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.bugmart/config.yaml)
    pub config: Option<PathBuf>,

    /// API base URL override
    pub api_url: Option<String>,

    /// Directory for the persistent cache database
    pub cache_dir: Option<PathBuf>,

    /// Keep cached data in memory only for this run
    pub no_cache: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_url: cli.api_url.clone(),
            cache_dir: cli.cache_dir.clone(),
            no_cache: cli.no_cache,
        }
    }

    /// Config file path, with the default applied.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }

    pub fn api_url_ref(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_override() {
        let opts = GlobalOptions {
            config: Some(PathBuf::from("/custom/config.yaml")),
            api_url: Some("http://localhost:8080".to_string()),
            ..Default::default()
        };

        assert_eq!(opts.config_path().unwrap(), PathBuf::from("/custom/config.yaml"));
        assert_eq!(opts.api_url_ref(), Some("http://localhost:8080"));
        assert!(!opts.no_cache);
    }

    #[test]
    fn test_default_config_path() {
        let opts = GlobalOptions::default();
        if let Ok(path) = opts.config_path() {
            assert!(path.ends_with(".bugmart/config.yaml"));
        }
        assert_eq!(opts.format, OutputFormat::Table);
    }
}
