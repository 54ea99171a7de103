//! Listing normalization and classification engine.
//!
//! Raw fragments go through the brand resolver and field normalizer into a
//! [`VehicleRecord`], then through the two-pass classifier, the price
//! reconciler and finally the aggregator.

pub mod aggregate;
pub mod brand;
pub mod classify;
pub mod fragments;
pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod retry;

pub use aggregate::{Annotation, Cell, ListingAggregator, Report, ReportGroup, Schema};
pub use brand::{BrandMatch, BrandResolver};
pub use classify::{CatalogueFlow, ClassifiedListings, CommercialModels, PendingListings};
pub use fragments::{DetailFragments, VariantFragments};
pub use models::{FuelType, LevyCategory, VehicleRecord};
pub use reconcile::LevyBenchmark;
pub use retry::RetryController;
