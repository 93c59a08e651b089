//! Category commands

use crate::cli::args::GlobalOptions;
use crate::cli::progress::with_spinner;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::Result;
use crate::models::CategoryDisplay;
use crate::output;

/// Run the category list command
///
/// Shows the top level by default, one parent's children with `--parent`,
/// or everything with `--all`.
pub async fn list(
    opts: &GlobalOptions,
    parent: Option<&str>,
    all: bool,
    locale: Option<&str>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let locale = ctx.locale(locale).to_string();
    let service = ctx.categories();

    let categories = with_spinner(ctx.format, "Fetching categories...", async {
        if all {
            service.list(&locale).await
        } else {
            service.children_of(&locale, parent).await
        }
    })
    .await?;

    let rows: Vec<CategoryDisplay> = categories.iter().map(CategoryDisplay::from).collect();
    output::print(&rows, ctx.format)
}

/// Run the category refresh command
pub fn refresh(opts: &GlobalOptions, locale: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let locale = ctx.locale(locale).to_string();
    ctx.categories().invalidate(&locale);

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "locale": locale, "invalidated": true });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            println!("Cached categories for '{}' cleared; the next lookup refetches them", locale)
        }
    }
    Ok(())
}
