//! Wanted posting display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_date, format_price, format_quantity, truncate_string};
use crate::client::models::WantedPost;

/// Wanted posting display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct WantedDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "CATEGORY")]
    pub category: String,

    #[tabled(rename = "QUANTITY")]
    pub quantity: String,

    #[tabled(rename = "BUDGET")]
    pub budget: String,

    #[tabled(rename = "LOCATION")]
    pub location: String,

    #[tabled(rename = "POSTED")]
    pub posted: String,
}

impl From<&WantedPost> for WantedDisplay {
    fn from(post: &WantedPost) -> Self {
        Self {
            id: post.id.clone(),
            title: truncate_string(&post.title, 40),
            category: post.category.clone().unwrap_or_else(|| "-".to_string()),
            quantity: format_quantity(post.quantity.as_deref(), post.unit.as_deref()),
            budget: format_price(post.budget, post.currency.as_deref()),
            location: post.location.clone().unwrap_or_else(|| "-".to_string()),
            posted: format_date(post.created_at.as_ref()),
        }
    }
}
