//! Catalogue-side collaborators: page source, selectors, fragment extraction
//! and query building.

pub mod catalogue;
pub mod client;
pub mod parser;
pub mod selectors;

pub use catalogue::{Catalogue, NewCarQuery, UsedGroup};
pub use client::{CatalogueClient, PageSource};
pub use parser::CatalogueParser;
