//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod browse;
mod common;
mod global;

pub use browse::BrowseArgs;
pub use common::OutputFormat;
pub use global::GlobalOptions;
