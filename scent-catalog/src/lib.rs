/// Scent catalog library
///
/// Provides the immutable perfume catalog, its scent-family taxonomy,
/// and multi-attribute search over both.

pub mod catalog;
pub mod matcher;

// Re-export main types
pub use catalog::{
    Catalog, CatalogError, CatalogItem, Gender, Intensity, Notes, PriceRange, ScentFamily,
};
pub use matcher::{Matcher, SearchParams, SearchResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
