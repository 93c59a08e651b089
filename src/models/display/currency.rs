//! Exchange rate display model

use serde::Serialize;
use tabled::Tabled;

/// One exchange rate for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct RateDisplay {
    #[tabled(rename = "BASE")]
    pub base: String,

    #[tabled(rename = "CURRENCY")]
    pub currency: String,

    #[tabled(rename = "RATE")]
    #[tabled(display = "display_rate")]
    pub rate: Option<f64>,
}

fn display_rate(rate: &Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.4}", rate),
        None => "unavailable".to_string(),
    }
}
