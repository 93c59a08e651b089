//! Listing commands

use log::warn;

use crate::cli::args::GlobalOptions;
use crate::cli::progress::with_spinner;
use crate::cli::{BrowseArgs, CommandContext, OutputFormat};
use crate::client::{ExchangeRateClient, Listing};
use crate::error::Result;
use crate::models::ListingDisplay;
use crate::models::display::{format_price, truncate_string};
use crate::output::{json, table};
use crate::services::CurrencyService;

/// Run the listing list command
pub async fn list(
    opts: &GlobalOptions,
    filters: &BrowseArgs,
    currency: Option<&str>,
) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let query = filters.to_query(ctx.config.preferences.page_size);

    let service = ctx.listings();
    let page = with_spinner(ctx.format, "Fetching listings...", service.list(&query)).await?;

    let target = display_currency(&ctx, currency);
    let rates = match &target {
        Some(_) => rate_service(&ctx),
        None => None,
    };

    let mut rows = Vec::with_capacity(page.items.len());
    for listing in &page.items {
        let row = ListingDisplay::from(listing);
        rows.push(match (&rates, &target) {
            (Some(rates), Some(target)) => convert_row(rates, listing, row, target).await,
            _ => row,
        });
    }

    match ctx.format {
        OutputFormat::Table => {
            println!("{}", table::format_table(&rows));
            let offset = query.offset.unwrap_or(0);
            if page.has_more(offset) {
                println!(
                    "\nShowing {}-{} of {}. Use --offset {} for more.",
                    offset + 1,
                    offset as usize + rows.len(),
                    page.total,
                    offset as usize + rows.len()
                );
            }
        }
        OutputFormat::Json => println!("{}", json::format_json_page(&rows, page.total)?),
    }

    Ok(())
}

/// Run the listing get command
pub async fn get(opts: &GlobalOptions, id: &str, currency: Option<&str>) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let service = ctx.listings();
    let listing = with_spinner(ctx.format, "Fetching listing...", service.get(id)).await?;

    if ctx.format == OutputFormat::Json {
        println!("{}", json::format_json(&listing)?);
        return Ok(());
    }

    let mut row = ListingDisplay::from(&listing);
    if let Some(target) = display_currency(&ctx, currency)
        && let Some(rates) = rate_service(&ctx)
    {
        row = convert_row(&rates, &listing, row, &target).await;
    }

    println!("{}", table::format_detail(&detail_fields(&listing, row)));
    Ok(())
}

/// Currency to show prices in: the flag, then the configured preference.
///
/// `None` when conversion is switched off.
fn display_currency(ctx: &CommandContext, requested: Option<&str>) -> Option<String> {
    if !ctx.config.features.currency_conversion {
        if requested.is_some() {
            warn!("Currency conversion is disabled; showing original prices");
        }
        return None;
    }
    requested
        .map(str::to_string)
        .or_else(|| ctx.config.preferences.currency.clone())
        .map(|code| code.trim().to_uppercase())
}

/// Currency service for price conversion; `None` (with a warning) when it
/// cannot be set up, so listings still show their listed prices.
fn rate_service(ctx: &CommandContext) -> Option<CurrencyService<ExchangeRateClient>> {
    match ctx.currency() {
        Ok(service) => Some(service),
        Err(e) => {
            warn!("Currency conversion unavailable ({}); showing listed prices", e);
            None
        }
    }
}

/// Swap the row's price for the converted amount; a failed conversion
/// leaves the original price in place.
async fn convert_row(
    rates: &CurrencyService<ExchangeRateClient>,
    listing: &Listing,
    row: ListingDisplay,
    target: &str,
) -> ListingDisplay {
    let (Some(price), Some(from)) = (listing.price, listing.currency.as_deref()) else {
        return row;
    };
    if from.eq_ignore_ascii_case(target) {
        return row;
    }

    match rates.convert(price, from, target).await {
        Ok(Some(amount)) => row.with_price(amount, target),
        Ok(None) => row,
        Err(e) => {
            warn!("Could not convert {} {} to {}: {}", price, from, target, e);
            row
        }
    }
}

fn detail_fields(listing: &Listing, row: ListingDisplay) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("ID", row.id),
        ("Title", listing.title.clone()),
        ("Category", row.category),
        ("Price", row.price),
    ];
    if row_was_converted(listing, &fields[3].1) {
        fields.push((
            "Listed at",
            format_price(listing.price, listing.currency.as_deref()),
        ));
    }
    fields.extend([
        ("Quantity", row.quantity),
        ("Location", row.location),
        ("Seller", row.seller),
        ("Posted", row.posted),
    ]);

    if let Some(description) = &listing.description {
        fields.push(("Description", truncate_string(description, 200)));
    }
    match &listing.contact {
        Some(contact) => {
            if let Some(email) = &contact.email {
                fields.push(("Email", email.clone()));
            }
            if let Some(phone) = &contact.phone {
                fields.push(("Phone", phone.clone()));
            }
        }
        None => fields.push(("Contact", "Log in to see contact details".to_string())),
    }
    fields
}

fn row_was_converted(listing: &Listing, shown: &str) -> bool {
    listing.price.is_some() && shown != format_price(listing.price, listing.currency.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::models::ContactInfo;
    use tempfile::TempDir;

    fn listing() -> Listing {
        serde_json::from_value(serde_json::json!({
            "id": "l-1",
            "title": "Dried mealworms",
            "price": 18.0,
            "currency": "USD",
        }))
        .unwrap()
    }

    #[test]
    fn test_detail_hides_contact_when_anonymous() {
        let listing = listing();
        let fields = detail_fields(&listing, ListingDisplay::from(&listing));

        assert!(fields.iter().any(|(name, _)| *name == "Contact"));
        assert!(!fields.iter().any(|(name, _)| *name == "Listed at"));
    }

    #[test]
    fn test_detail_shows_contact_and_original_price() {
        let mut listing = listing();
        listing.contact = Some(ContactInfo {
            email: Some("ana@example.com".to_string()),
            phone: None,
        });
        let row = ListingDisplay::from(&listing).with_price(16.56, "EUR");
        let fields = detail_fields(&listing, row);

        let get = |key: &str| {
            fields
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(get("Price").as_deref(), Some("16.56 EUR"));
        assert_eq!(get("Listed at").as_deref(), Some("18.00 USD"));
        assert_eq!(get("Email").as_deref(), Some("ana@example.com"));
        assert!(get("Contact").is_none());
    }

    #[test]
    fn test_broken_rate_service_keeps_listed_price() {
        let dir = TempDir::new().unwrap();
        let opts = GlobalOptions {
            config: Some(dir.path().join("config.yaml")),
            no_cache: true,
            ..Default::default()
        };
        let mut ctx = CommandContext::new(&opts).unwrap();
        ctx.config.currency.rates_url = "not a url".to_string();

        assert_eq!(display_currency(&ctx, Some("eur")).as_deref(), Some("EUR"));
        assert!(rate_service(&ctx).is_none());
    }
}
