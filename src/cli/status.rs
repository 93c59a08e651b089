//! Status command implementation

use colored::Colorize;

use crate::cache::SqliteStore;
use crate::cli::args::GlobalOptions;
use crate::cli::context::cache_dir;
use crate::config::Config;
use crate::error::Result;

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "BugMart Status".bold());

    let config_path = opts.config_path()?;
    let config = if config_path.exists() {
        println!("Config file: {}", config_path.display().to_string().cyan());
        Config::load_from(&config_path)?
    } else {
        println!(
            "{} No config file at {} (using defaults)",
            "○".dimmed(),
            config_path.display()
        );
        println!("  → Run 'bugmart init' to create one");
        Config::default()
    };

    let api_url = opts.api_url_ref().unwrap_or(config.api_url());
    println!("API: {}", api_url.cyan());
    println!();

    if config.token.is_some() {
        println!("{} API token configured", "✓".green());
    } else {
        println!("{} Not logged in (contact details are hidden)", "✗".red());
        println!("  → Run 'bugmart login' to add a token");
    }

    if config.features.currency_conversion {
        let target = config
            .preferences
            .currency
            .as_deref()
            .unwrap_or("original prices");
        println!(
            "{} Currency conversion enabled (base {}, showing {})",
            "✓".green(),
            config.currency.base,
            target
        );
    } else {
        println!("{} Currency conversion disabled", "○".dimmed());
    }

    println!("{} Category locale: {}", "✓".green(), config.preferences.locale);

    if opts.no_cache {
        println!("{} Persistent cache disabled for this run", "○".dimmed());
    } else {
        let dir = cache_dir(opts)?;
        match SqliteStore::open_at(&dir).and_then(|store| store.stats()) {
            Ok(stats) => println!(
                "{} Cache: {} entries in {}",
                "✓".green(),
                stats.entries,
                dir.display()
            ),
            Err(e) => println!("{} Cache unavailable: {}", "⚠".yellow(), e),
        }
    }

    Ok(())
}
