pub mod catalog;

pub use catalog::{CatalogApi, CatalogClient, CatalogError};
