//! JSON output formatting

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Wrapper for JSON output with metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T> {
    pub data: T,

    pub meta: Metadata,
}

/// Metadata included in JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct Metadata {
    /// When the output was produced
    pub timestamp: String,

    /// CLI version
    pub version: String,

    /// Size of the whole collection when `data` is one page of it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now().to_rfc3339(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                total: None,
            },
        }
    }

    /// Record the collection size for paged output.
    pub fn with_total(mut self, total: u64) -> Self {
        self.meta.total = Some(total);
        self
    }
}

/// Format data as pretty-printed JSON
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

/// Format one page of a collection, with its total in the metadata
pub fn format_json_page<T: Serialize + ?Sized>(
    data: &T,
    total: u64,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data).with_total(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize)]
    struct Rate {
        currency: String,
        rate: Option<f64>,
    }

    #[test]
    fn test_format_json_wraps_data_with_meta() {
        let rates = vec![Rate {
            currency: "EUR".to_string(),
            rate: Some(0.92),
        }];

        let result = format_json(&rates).unwrap();

        assert!(result.contains("\"data\""));
        assert!(result.contains("\"currency\": \"EUR\""));
        assert!(result.contains("\"version\""));
        assert!(!result.contains("\"total\""));
    }

    #[test]
    fn test_format_json_empty_vec() {
        let rates: Vec<Rate> = vec![];
        let result = format_json(&rates).unwrap();

        assert!(result.contains("\"data\": []"));
    }

    #[test]
    fn test_format_json_page_includes_total() {
        let rates = vec![Rate {
            currency: "BRL".to_string(),
            rate: None,
        }];

        let value: serde_json::Value =
            serde_json::from_str(&format_json_page(&rates, 42).unwrap()).unwrap();
        assert_eq!(value["meta"]["total"], 42);
        assert!(value["data"][0]["rate"].is_null());
    }
}
