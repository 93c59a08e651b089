//! Wanted posting commands

use crate::cli::args::GlobalOptions;
use crate::cli::progress::with_spinner;
use crate::cli::{BrowseArgs, CommandContext, OutputFormat};
use crate::client::WantedPost;
use crate::error::Result;
use crate::models::WantedDisplay;
use crate::output::{json, table};

/// Run the wanted list command
pub async fn list(opts: &GlobalOptions, filters: &BrowseArgs) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let query = filters.to_query(ctx.config.preferences.page_size);

    let service = ctx.wanted();
    let page = with_spinner(ctx.format, "Fetching wanted postings...", service.list(&query)).await?;
    let rows: Vec<WantedDisplay> = page.items.iter().map(WantedDisplay::from).collect();

    match ctx.format {
        OutputFormat::Table => println!("{}", table::format_table(&rows)),
        OutputFormat::Json => println!("{}", json::format_json_page(&rows, page.total)?),
    }

    Ok(())
}

/// Run the wanted get command
pub async fn get(opts: &GlobalOptions, id: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let service = ctx.wanted();
    let post = with_spinner(ctx.format, "Fetching wanted posting...", service.get(id)).await?;

    match ctx.format {
        OutputFormat::Table => println!("{}", table::format_detail(&detail_fields(&post))),
        OutputFormat::Json => println!("{}", json::format_json(&post)?),
    }

    Ok(())
}

fn detail_fields(post: &WantedPost) -> Vec<(&'static str, String)> {
    let row = WantedDisplay::from(post);
    let mut fields = vec![
        ("ID", row.id),
        ("Title", post.title.clone()),
        ("Category", row.category),
        ("Quantity", row.quantity),
        ("Budget", row.budget),
        ("Location", row.location),
        ("Posted", row.posted),
    ];
    if let Some(author) = &post.author {
        fields.push(("Buyer", author.company.clone().unwrap_or_else(|| author.name.clone())));
    }
    if let Some(description) = &post.description {
        fields.push(("Description", description.clone()));
    }
    if let Some(email) = post.contact.as_ref().and_then(|c| c.email.clone()) {
        fields.push(("Email", email));
    }
    fields
}
