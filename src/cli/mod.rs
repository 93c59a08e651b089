//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod auth;
pub mod cache;
pub mod category;
pub mod completions;
pub mod context;
pub mod currency;
pub mod init;
pub mod listing;
pub mod progress;
pub mod status;
pub mod wanted;

pub use args::{BrowseArgs, OutputFormat};
pub use context::CommandContext;

/// BugMart CLI - browse the insect-farming marketplace from the terminal
#[derive(Parser, Debug)]
#[command(name = "bugmart")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "BUGMART_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "BUGMART_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true, env = "BUGMART_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Override the persistent cache directory
    #[arg(long, global = true, env = "BUGMART_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Don't read or write the persistent cache
    #[arg(long, global = true, env = "BUGMART_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Enable debug logging
    #[arg(long, global = true, env = "BUGMART_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize BugMart configuration
    Init,

    /// Show authentication, configuration and cache status
    Status,

    /// Store an API token and verify it
    Login {
        /// API token (prompted for when omitted)
        #[arg(long, env = "BUGMART_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Save the token without checking it against the API
        #[arg(long)]
        no_verify: bool,
    },

    /// Remove the stored API token
    Logout,

    /// Browse product listings
    #[command(subcommand)]
    Listing(ListingCommands),

    /// Browse wanted postings
    #[command(subcommand)]
    Wanted(WantedCommands),

    /// Browse the category taxonomy
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Exchange rates and price conversion
    #[command(subcommand)]
    Currency(CurrencyCommands),

    /// Manage the persistent cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   bugmart completion bash > /etc/bash_completion.d/bugmart
  zsh:    bugmart completion zsh > \"${fpath[1]}/_bugmart\"
  fish:   bugmart completion fish > ~/.config/fish/completions/bugmart.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Listing subcommands
#[derive(Subcommand, Debug)]
pub enum ListingCommands {
    /// List product listings
    List {
        #[command(flatten)]
        filters: BrowseArgs,

        /// Show prices in this currency (defaults to the configured preference)
        #[arg(long)]
        currency: Option<String>,
    },

    /// Show one listing
    Get {
        /// Listing ID
        id: String,

        /// Show the price in this currency
        #[arg(long)]
        currency: Option<String>,
    },
}

/// Wanted posting subcommands
#[derive(Subcommand, Debug)]
pub enum WantedCommands {
    /// List wanted postings
    List {
        #[command(flatten)]
        filters: BrowseArgs,
    },

    /// Show one wanted posting
    Get {
        /// Posting ID
        id: String,
    },
}

/// Category subcommands
#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only show children of this category ID
        #[arg(long)]
        parent: Option<String>,

        /// Show the whole tree instead of one level
        #[arg(long, conflicts_with = "parent")]
        all: bool,

        /// Locale for category names (defaults to the configured preference)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Forget the cached taxonomy for a locale
    Refresh {
        #[arg(long)]
        locale: Option<String>,
    },
}

/// Currency subcommands
#[derive(Subcommand, Debug)]
pub enum CurrencyCommands {
    /// Show the exchange rate from the base currency
    Rate {
        /// ISO 4217 currency code, e.g. EUR
        code: String,
    },

    /// Convert an amount between currencies
    Convert {
        amount: f64,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Forget the cached rate for a currency
    Refresh {
        code: String,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,

    /// Remove every cached record
    Clear,

    /// Print the cache directory
    Path,
}
