//! Display model implementations for table and JSON output
//!
//! Display models transform API response types into CLI-friendly formats
//! with appropriate column names and serialization.

mod category;
mod common;
mod currency;
mod listing;
mod wanted;

pub use category::CategoryDisplay;
pub use common::{format_price, truncate_string};
pub use currency::RateDisplay;
pub use listing::ListingDisplay;
pub use wanted::WantedDisplay;
