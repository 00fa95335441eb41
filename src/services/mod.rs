//! External service clients.

pub mod catalog;

pub use catalog::{CatalogApi, CatalogClient, CatalogRecord, SuppressionEntry};
