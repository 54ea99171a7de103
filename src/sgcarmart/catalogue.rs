//! Catalogue query building: listing URLs per fuel type, band and page.

use crate::listing::models::{FuelType, LevyCategory};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BASE_URL: &str = "https://www.sgcarmart.com";

const BRANDS_PATH: &str = "/new_cars/newcars_brand_landing.php";
const NEW_LISTING_PATH: &str = "/new_cars/newcars_listing.php";
const USED_LISTING_PATH: &str = "/used_cars/listing.php";

/// Vehicle-type filters shared by every used-car query (passenger body types).
const USED_VEHICLE_TYPES: &[u32] = &[10, 11, 12, 13, 2, 3, 7, 8, 9];

/// One new-catalogue query: a fuel type, and for non-EVs the COE band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCarQuery {
    pub fuel: FuelType,
    pub band: Option<LevyCategory>,
}

impl NewCarQuery {
    /// The queries needed to cover one fuel type: a single unbanded query for
    /// EVs, one query per band A and B otherwise.
    pub fn all_for(fuel: FuelType) -> Vec<NewCarQuery> {
        if fuel.is_electric() {
            vec![NewCarQuery { fuel, band: None }]
        } else {
            [LevyCategory::A, LevyCategory::B]
                .into_iter()
                .map(|band| NewCarQuery { fuel, band: Some(band) })
                .collect()
        }
    }

    /// Catalogue fuel code used in the `FUE` parameter.
    fn fuel_code(&self) -> Option<&'static str> {
        match self.fuel {
            FuelType::Petrol => Some("p"),
            FuelType::Diesel => Some("d"),
            FuelType::PetrolElectric => Some("r"),
            FuelType::DieselElectric => Some("i"),
            FuelType::Electric | FuelType::Unknown => None,
        }
    }
}

impl fmt::Display for NewCarQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.band {
            Some(band) => write!(f, "{} (COE {})", self.fuel, band),
            None => write!(f, "{}", self.fuel),
        }
    }
}

/// Used-car listing groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsedGroup {
    Petrol,
    Hybrid,
    Ev,
}

impl UsedGroup {
    pub fn all() -> &'static [UsedGroup] {
        &[UsedGroup::Petrol, UsedGroup::Hybrid, UsedGroup::Ev]
    }

    pub fn label(&self) -> &'static str {
        match self {
            UsedGroup::Petrol => "Petrol",
            UsedGroup::Hybrid => "Hybrid",
            UsedGroup::Ev => "EV",
        }
    }

    pub fn fuel_type(&self) -> FuelType {
        match self {
            UsedGroup::Petrol => FuelType::Petrol,
            UsedGroup::Hybrid => FuelType::PetrolElectric,
            UsedGroup::Ev => FuelType::Electric,
        }
    }

    /// Report group name, e.g. "EV Used Cars".
    pub fn sheet_name(&self) -> String {
        format!("{} Used Cars", self.label())
    }
}

impl fmt::Display for UsedGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for UsedGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "petrol" => Ok(UsedGroup::Petrol),
            "hybrid" | "petrol-electric" => Ok(UsedGroup::Hybrid),
            "ev" | "electric" => Ok(UsedGroup::Ev),
            _ => Err(format!("Unknown used-car group: {}. Use: petrol, hybrid, ev", s)),
        }
    }
}

/// URL builder for one catalogue host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    base_url: String,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Catalogue {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn brands_url(&self) -> String {
        format!("{}{}", self.base_url, BRANDS_PATH)
    }

    /// New-catalogue listing page starting at result offset `start`.
    pub fn new_listing_url(&self, query: &NewCarQuery, start: u32, page_size: u32) -> String {
        let params = match (query.fuel_code(), query.band) {
            (Some(code), Some(band)) => {
                format!("?FUE={}&DT=Coe{}&ASL=1&RPG={}", code, band, page_size)
            }
            (Some(code), None) => format!("?FUE={}&ASL=1&RPG={}", code, page_size),
            (None, _) => format!("?VT=Electric&RPG={}", page_size),
        };
        format!("{}{}{}&BRSR={}", self.base_url, NEW_LISTING_PATH, params, start)
    }

    /// Commercial-vehicle listing page.
    pub fn commercial_listing_url(&self, start: u32, page_size: u32) -> String {
        format!(
            "{}{}?BRSR={}&FUE=&VTS%5B%5D=1&RPG={}",
            self.base_url, NEW_LISTING_PATH, start, page_size
        )
    }

    /// Used-catalogue listing page.
    pub fn used_listing_url(&self, group: UsedGroup, start: u32, page_size: u32) -> String {
        let fuel = match group {
            UsedGroup::Petrol => "Petrol",
            UsedGroup::Hybrid => "Petrol-Electric",
            UsedGroup::Ev => "Electric",
        };

        let mut url = format!(
            "{}{}?ORD=MAK_ASC&ASL=1&RPG={}&DP2=&DP1=&AVL=2&OPC%5B%5D=0&FUE={}&CTS%5B%5D=18",
            self.base_url, USED_LISTING_PATH, page_size, fuel
        );
        if group == UsedGroup::Ev {
            url.push_str("&CTS%5B%5D=25");
        }
        for vts in USED_VEHICLE_TYPES {
            url.push_str(&format!("&VTS%5B%5D={}", vts));
        }
        url.push_str(&format!("&PR2=&PR1=&BRSR={}", start));
        url
    }

    /// Resolves a link found on a catalogue page against the host.
    pub fn absolute(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_string()
        } else if href.starts_with('/') {
            format!("{}{}", self.base_url, href)
        } else {
            format!("{}/{}", self.base_url, href)
        }
    }
}
