//! Login and logout commands

use colored::Colorize;
use dialoguer::{Password, theme::ColorfulTheme};
use log::debug;

use crate::cli::args::GlobalOptions;
use crate::cli::progress::with_spinner;
use crate::cli::CommandContext;
use crate::client::MarketplaceApi;
use crate::error::Result;

/// Run the login command
///
/// The token is checked against the profile endpoint before it is saved,
/// unless `no_verify` is set.
pub async fn login(opts: &GlobalOptions, token: Option<String>, no_verify: bool) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    let token = match token.filter(|t| !t.trim().is_empty()) {
        Some(token) => token,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Enter your BugMart API token")
            .interact()?,
    };
    let token = token.trim().to_string();

    if !ctx.auth.set_token(Some(token.clone())) {
        debug!("Token matches the saved one");
    }

    if no_verify {
        println!("{} Token saved without verification", "⚠".yellow());
    } else {
        let profile = with_spinner(ctx.format, "Verifying token...", ctx.api.get_profile()).await?;
        let who = profile.company.as_deref().unwrap_or(&profile.name);
        println!("{} Logged in as {}", "✓".green(), who.bold());
    }

    ctx.config.token = Some(token);
    ctx.save_config()?;
    Ok(())
}

/// Run the logout command
pub fn logout(opts: &GlobalOptions) -> Result<()> {
    let mut ctx = CommandContext::new(opts)?;

    if ctx.config.token.take().is_none() {
        println!("Not logged in");
        return Ok(());
    }
    if ctx.auth.set_token(None) {
        debug!("Cleared token from the session");
    }
    ctx.save_config()?;

    println!("{} Token removed", "✓".green());
    Ok(())
}
