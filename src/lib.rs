//! vpes - Vehicle price extraction for the Singapore car catalogue
//!
//! Normalizes new and used car listings into uniform records, assigns each a
//! COE category and completes its price with the current COE premium.

pub mod coe;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod listing;
pub mod sgcarmart;

pub use config::Config;
pub use error::FetchError;
pub use listing::models::{FuelType, LevyCategory, VehicleRecord};
pub use listing::reconcile::LevyBenchmark;
pub use listing::Report;
