//! Algolia REST implementation of the `scout-settings` index capabilities.
//!
//! Any server speaking the Algolia v1 index API works; point
//! [`AlgoliaConfig::base_url`] at it.

pub mod client;
pub mod config;
pub mod types;

pub use client::{AlgoliaClient, AlgoliaIndex, AlgoliaTask};
pub use config::AlgoliaConfig;
