//! Marketplace listing models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product listing offered by a seller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Listing ID
    pub id: String,

    /// Listing title
    pub title: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Category slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Unit price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// ISO 4217 currency of `price`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Available quantity, e.g. "50"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    /// Quantity unit, e.g. "kg"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller: Option<PartySummary>,

    /// Only present for authenticated requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Seller, buyer or company summary embedded in postings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// Contact details, withheld from anonymous users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One page of a collection response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,

    /// Total matching items across all pages
    #[serde(default)]
    pub total: u64,
}

impl<T> Page<T> {
    /// Whether items exist beyond `offset + items.len()`.
    pub fn has_more(&self, offset: u32) -> bool {
        (offset as u64 + self.items.len() as u64) < self.total
    }
}
