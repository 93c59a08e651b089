//! Category taxonomy models

use serde::{Deserialize, Serialize};

/// Node of the product category taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,

    /// URL-safe identifier, e.g. "black-soldier-fly"
    pub slug: String,

    /// Localized display name
    pub name: String,

    /// Parent category ID; `None` for top-level categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_count: Option<u32>,
}

impl Category {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
