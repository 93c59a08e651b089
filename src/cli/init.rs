//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::DEFAULT_API_URL;
use crate::config::Config;
use crate::error::Result;
use crate::services::currency::normalize_code;

/// Locales the category taxonomy is published in
const LOCALES: &[&str] = &["en", "pt", "es"];

/// Run the init command
///
/// Existing values are offered as defaults, so re-running init edits the
/// current config instead of starting over.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let config_path = opts.config_path()?;
    let mut config = Config::load_or_default(&config_path)?;
    let theme = ColorfulTheme::default();

    println!("{}", "Welcome to BugMart!".bold().green());
    println!("Let's set up your marketplace configuration.\n");

    let api_url: String = Input::with_theme(&theme)
        .with_prompt("API URL")
        .default(
            opts.api_url_ref()
                .unwrap_or(config.api_url())
                .to_string(),
        )
        .interact_text()?;
    config.api_url = (api_url != DEFAULT_API_URL).then_some(api_url);

    let token: String = Password::with_theme(&theme)
        .with_prompt("API token (leave empty to browse anonymously)")
        .allow_empty_password(true)
        .interact()?;
    if !token.trim().is_empty() {
        config.token = Some(token.trim().to_string());
    }

    let current = LOCALES
        .iter()
        .position(|l| *l == config.preferences.locale)
        .unwrap_or(0);
    let locale = Select::with_theme(&theme)
        .with_prompt("Category language")
        .items(LOCALES)
        .default(current)
        .interact()?;
    config.preferences.locale = LOCALES[locale].to_string();

    config.features.currency_conversion = Confirm::with_theme(&theme)
        .with_prompt("Show prices converted to your currency?")
        .default(config.features.currency_conversion)
        .interact()?;

    if config.features.currency_conversion {
        let code: String = Input::with_theme(&theme)
            .with_prompt("Preferred currency (ISO code, empty for original prices)")
            .default(config.preferences.currency.clone().unwrap_or_default())
            .allow_empty(true)
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                if input.trim().is_empty() {
                    return Ok(());
                }
                normalize_code(input).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;
        config.preferences.currency = match code.trim() {
            "" => None,
            code => Some(normalize_code(code)?),
        };
    }

    config.validate()?;
    config.save_to(&config_path)?;

    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "bugmart status".cyan());
    println!("  {} - Browse listings", "bugmart listing list".cyan());

    Ok(())
}
