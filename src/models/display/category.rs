//! Category display model

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::Category;

/// Category display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CategoryDisplay {
    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "SLUG")]
    pub slug: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "PARENT")]
    pub parent: String,

    #[tabled(rename = "LISTINGS")]
    pub listings: String,
}

impl From<&Category> for CategoryDisplay {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            slug: category.slug.clone(),
            name: category.name.clone(),
            parent: category.parent_id.clone().unwrap_or_else(|| "-".to_string()),
            listings: category
                .listing_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}
