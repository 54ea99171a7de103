//! All-in price derivation from the listed price and the COE benchmark.

use crate::listing::models::{LevyCategory, VehicleRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Latest COE quota premiums, one per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevyBenchmark {
    pub category_a: f64,
    pub category_b: f64,
    pub category_c: f64,
    /// Bidding round the figures belong to, e.g. "October 2026 (2nd bidding)"
    pub label: String,
}

impl LevyBenchmark {
    pub fn new(category_a: f64, category_b: f64, category_c: f64, label: impl Into<String>) -> Self {
        Self { category_a, category_b, category_c, label: label.into() }
    }

    /// Premium for a category, `None` for [`LevyCategory::Unknown`].
    pub fn price_for(&self, category: LevyCategory) -> Option<f64> {
        match category {
            LevyCategory::A => Some(self.category_a),
            LevyCategory::B => Some(self.category_b),
            LevyCategory::C => Some(self.category_c),
            LevyCategory::Unknown => None,
        }
    }
}

/// Derives the all-in price of a record.
///
/// A price that already includes COE is taken as is. Otherwise the premium for
/// the record's category is added, which needs both a known category and a
/// benchmark.
pub fn price_with_levy(record: &VehicleRecord, benchmark: Option<&LevyBenchmark>) -> Option<f64> {
    let listed = record.listed_price?;
    if record.price_includes_levy {
        return Some(listed);
    }
    let premium = benchmark?.price_for(record.levy_category)?;
    Some(listed + premium)
}

/// Fills in `price_with_levy` on a classified record.
pub fn reconcile(record: &mut VehicleRecord, benchmark: Option<&LevyBenchmark>) {
    record.price_with_levy = price_with_levy(record, benchmark);

    if record.price_with_levy.is_none() && record.listed_price.is_some() {
        warn!(
            "No COE-inclusive price for {} (category {}, benchmark {})",
            record.display_name(),
            record.levy_category,
            if benchmark.is_some() { "available" } else { "missing" }
        );
    }
}
