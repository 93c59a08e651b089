//! Listing display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_date, format_price, format_quantity, truncate_string};
use crate::client::models::Listing;

/// Listing display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ListingDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "CATEGORY")]
    pub category: String,

    /// Price, converted when a display currency was requested
    #[tabled(rename = "PRICE")]
    pub price: String,

    #[tabled(rename = "QUANTITY")]
    pub quantity: String,

    #[tabled(rename = "LOCATION")]
    pub location: String,

    #[tabled(rename = "SELLER")]
    pub seller: String,

    #[tabled(rename = "POSTED")]
    pub posted: String,
}

impl ListingDisplay {
    /// Replace the price column with an amount in another currency.
    pub fn with_price(mut self, amount: f64, currency: &str) -> Self {
        self.price = format_price(Some(amount), Some(currency));
        self
    }
}

impl From<&Listing> for ListingDisplay {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            title: truncate_string(&listing.title, 40),
            category: listing.category.clone().unwrap_or_else(|| "-".to_string()),
            price: format_price(listing.price, listing.currency.as_deref()),
            quantity: format_quantity(listing.quantity.as_deref(), listing.unit.as_deref()),
            location: listing.location.clone().unwrap_or_else(|| "-".to_string()),
            seller: listing
                .seller
                .as_ref()
                .map(|s| s.company.clone().unwrap_or_else(|| s.name.clone()))
                .unwrap_or_else(|| "-".to_string()),
            posted: format_date(listing.created_at.as_ref()),
        }
    }
}
