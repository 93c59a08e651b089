//! BugMart CLI - browse the insect-farming marketplace from the terminal

use clap::Parser;
use log::LevelFilter;

use bugmart::cli::args::GlobalOptions;
use bugmart::cli::{
    self, CacheCommands, CategoryCommands, Cli, Commands, CurrencyCommands, ListingCommands,
    WantedCommands,
};
use bugmart::error::{ApiError, Result};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        match err.as_api() {
            Some(ApiError::RateLimited(_)) => {
                eprintln!("  → The marketplace is busy; try again later")
            }
            Some(e) if e.is_transport() => {
                eprintln!("  → Check your network connection or --api-url")
            }
            _ => {}
        }
        std::process::exit(1);
    }
}

/// `--debug` wins; otherwise RUST_LOG, defaulting to warnings only.
fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Login { token, no_verify } => cli::auth::login(&opts, token, no_verify).await,
        Commands::Logout => cli::auth::logout(&opts),
        Commands::Listing(cmd) => match cmd {
            ListingCommands::List { filters, currency } => {
                cli::listing::list(&opts, &filters, currency.as_deref()).await
            }
            ListingCommands::Get { id, currency } => {
                cli::listing::get(&opts, &id, currency.as_deref()).await
            }
        },
        Commands::Wanted(cmd) => match cmd {
            WantedCommands::List { filters } => cli::wanted::list(&opts, &filters).await,
            WantedCommands::Get { id } => cli::wanted::get(&opts, &id).await,
        },
        Commands::Category(cmd) => match cmd {
            CategoryCommands::List {
                parent,
                all,
                locale,
            } => cli::category::list(&opts, parent.as_deref(), all, locale.as_deref()).await,
            CategoryCommands::Refresh { locale } => {
                cli::category::refresh(&opts, locale.as_deref())
            }
        },
        Commands::Currency(cmd) => match cmd {
            CurrencyCommands::Rate { code } => cli::currency::rate(&opts, &code).await,
            CurrencyCommands::Convert { amount, from, to } => {
                cli::currency::convert(&opts, amount, &from, &to).await
            }
            CurrencyCommands::Refresh { code } => cli::currency::refresh(&opts, &code),
        },
        Commands::Cache(cmd) => match cmd {
            CacheCommands::Status => cli::cache::status(&opts),
            CacheCommands::Clear => cli::cache::clear(&opts),
            CacheCommands::Path => cli::cache::path(&opts),
        },
        Commands::Completion { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
    }
}
