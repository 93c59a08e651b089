//! BugMart - caching client and CLI for the insect-farming marketplace
//!
//! The crate is layered bottom-up:
//! - [`cache`]: TTL map, single-flight, read-through query cache and the
//!   persistent fallback store
//! - [`client`]: HTTP clients for the marketplace API and the exchange
//!   rate provider
//! - [`services`]: per-domain services that compose the two
//! - [`cli`]: the `bugmart` command line

pub mod auth;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod services;

pub use error::{ApiError, ApiResult, Error, Result};
