//! Spending categories and their approval policy.
//!
//! Cost types are administered outside this service; the catalog is a
//! read-only, cached view over a [`CostTypeRepository`].

mod catalog;
mod error;
mod types;

pub use catalog::{CostTypeCatalog, CostTypeRepository};
pub use error::CatalogError;
pub use types::CostType;
