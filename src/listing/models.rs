//! Data models for vehicle listings, fuel types and COE categories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fuel type a listing was catalogued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FuelType {
    Petrol,
    Diesel,
    PetrolElectric,
    DieselElectric,
    Electric,
    #[default]
    Unknown,
}

impl FuelType {
    /// Human-readable label, as the catalogue spells it.
    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::PetrolElectric => "Petrol-Electric",
            FuelType::DieselElectric => "Diesel-Electric",
            FuelType::Electric => "Electric",
            FuelType::Unknown => "Unknown",
        }
    }

    /// Returns true for battery-electric vehicles.
    pub fn is_electric(&self) -> bool {
        matches!(self, FuelType::Electric)
    }

    /// Returns every concrete fuel type, in new-catalogue query order.
    pub fn all() -> &'static [FuelType] {
        &[
            FuelType::Electric,
            FuelType::Petrol,
            FuelType::Diesel,
            FuelType::PetrolElectric,
            FuelType::DieselElectric,
        ]
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for FuelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "petrol" | "p" => Ok(FuelType::Petrol),
            "diesel" | "d" => Ok(FuelType::Diesel),
            "petrol-electric" | "hybrid" | "r" => Ok(FuelType::PetrolElectric),
            "diesel-electric" | "i" => Ok(FuelType::DieselElectric),
            "electric" | "ev" | "e" => Ok(FuelType::Electric),
            _ => Err(format!(
                "Unknown fuel type: {}. Use: petrol, diesel, petrol-electric, diesel-electric, electric",
                s
            )),
        }
    }
}

/// COE bidding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LevyCategory {
    A,
    B,
    C,
    /// Classification inputs were missing.
    #[default]
    Unknown,
}

impl LevyCategory {
    /// Returns true for A, B and C.
    pub fn is_known(&self) -> bool {
        !matches!(self, LevyCategory::Unknown)
    }
}

impl fmt::Display for LevyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LevyCategory::A => "A",
            LevyCategory::B => "B",
            LevyCategory::C => "C",
            LevyCategory::Unknown => "Unknown",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for LevyCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(LevyCategory::A),
            "B" => Ok(LevyCategory::B),
            "C" => Ok(LevyCategory::C),
            _ => Err(format!("Unknown COE category: {}. Use: A, B, C", s)),
        }
    }
}

/// One normalized listing.
///
/// Every optional field uses `None` as the NIL sentinel. A record is built once
/// from its fragments, then gets its category from the classifier and its
/// all-in price from the reconciler before it is handed to the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Brand, `None` when it could not be resolved
    pub make: Option<String>,
    /// Model text with the brand removed (may be empty)
    pub model: Option<String>,
    /// Variant description from the new-car catalogue
    pub specification: Option<String>,
    pub fuel_type: FuelType,
    /// Set once the model is found in the commercial catalogue
    pub commercial: bool,
    /// Price as listed
    pub listed_price: Option<f64>,
    /// False when the listing is marked as excluding COE
    pub price_includes_levy: bool,
    pub levy_category: LevyCategory,
    /// Listed price plus COE where needed
    pub price_with_levy: Option<f64>,
    pub power_kw: Option<f64>,
    pub power_bhp: Option<u32>,
    pub engine_capacity_cc: Option<u32>,
    pub mileage_km: Option<u32>,
    pub registration_date: Option<NaiveDate>,
    /// Free text such as "4yrs 2mths COE left"
    pub levy_duration_remaining: Option<String>,
    pub owner_count: Option<u32>,
    pub dereg_value: Option<f64>,
    pub omv: Option<f64>,
    pub coe: Option<f64>,
    pub arf: Option<f64>,
    pub depreciation_per_year: Option<f64>,
    pub road_tax_per_year: Option<f64>,
    /// Body type, e.g. "Mid-Sized Sedan"
    pub body_type: Option<String>,
    /// Listing URL
    pub source_link: String,
}

impl VehicleRecord {
    /// Creates a record with identity fields set and everything else NIL.
    pub fn new(
        make: Option<String>,
        model: impl Into<String>,
        fuel_type: FuelType,
        source_link: impl Into<String>,
    ) -> Self {
        Self {
            make,
            model: Some(model.into()),
            fuel_type,
            price_includes_levy: true,
            source_link: source_link.into(),
            ..Self::default()
        }
    }

    /// Creates the all-NIL row that stands in for a listing that could not be read.
    pub fn placeholder(source_link: impl Into<String>) -> Self {
        Self { source_link: source_link.into(), ..Self::default() }
    }

    /// Returns true if this is a placeholder for an unreadable listing.
    pub fn is_placeholder(&self) -> bool {
        self.make.is_none() && self.model.is_none() && self.listed_price.is_none()
    }

    /// "Make Model" for log lines.
    pub fn display_name(&self) -> String {
        match (&self.make, &self.model) {
            (Some(make), Some(model)) if !model.is_empty() => format!("{} {}", make, model),
            (Some(make), _) => make.clone(),
            (None, Some(model)) => model.clone(),
            (None, None) => self.source_link.clone(),
        }
    }
}
