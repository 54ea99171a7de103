//! Field normalizers: raw text fragments to typed values.
//!
//! Every parser here is total. Input that cannot be read yields `None` and a
//! `debug!` event naming the field, never an error.

use crate::listing::brand::BrandResolver;
use crate::listing::fragments::{DetailFragments, VariantFragments};
use crate::listing::models::{FuelType, VehicleRecord};
use chrono::NaiveDate;
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Marker on a price line that does not include COE.
pub const LEVY_EXCLUDED_MARKER: &str = "(w/o COE)";

static FIRST_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());

static COMBINED_POWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*kW\s*\((\d+)\s*bhp\)").unwrap());

static BHP_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*bhp").unwrap());

const DATE_FORMATS: &[&str] = &["%d-%b-%Y", "%d %b %Y", "%d/%m/%Y", "%Y-%m-%d"];

/// A listed price and whether it already covers COE.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListedPrice {
    pub amount: Option<f64>,
    pub includes_levy: bool,
}

/// Power as kW and bhp.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PowerReading {
    pub kw: Option<f64>,
    pub bhp: Option<u32>,
}

/// A date with its trailing parenthetical, e.g. "12-Mar-2019 (4yrs COE left)".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatedFragment {
    pub date: Option<NaiveDate>,
    pub remainder: Option<String>,
}

fn unparseable<T>(field: &'static str, raw: &str) -> Option<T> {
    debug!(field, raw, "Unparseable fragment, recording NIL");
    None
}

/// Parses a new-catalogue price cell.
///
/// Only the first amount on the first line counts; a second "$" figure (the
/// price without COE) is ignored. The price excludes COE when the marker
/// appears anywhere in the fragment.
pub fn parse_listed_price(raw: &str) -> ListedPrice {
    let includes_levy = !raw.contains(LEVY_EXCLUDED_MARKER);

    let first_line = raw.trim().lines().next().unwrap_or_default();
    let amount = FIRST_AMOUNT
        .find(first_line)
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .or_else(|| unparseable("price", raw));

    ListedPrice { amount, includes_levy }
}

/// Parses a combined "<n> kW (<m> bhp)" reading. Both halves or neither.
pub fn parse_power(raw: &str) -> PowerReading {
    let Some(caps) = COMBINED_POWER.captures(raw) else {
        return unparseable("power", raw).unwrap_or_default();
    };

    match (caps[1].parse::<f64>(), caps[2].parse::<u32>()) {
        (Ok(kw), Ok(bhp)) => PowerReading { kw: Some(kw), bhp: Some(bhp) },
        _ => unparseable("power", raw).unwrap_or_default(),
    }
}

/// Parses a bhp-only reading such as "201 bhp" (listing pages carry no kW).
pub fn parse_bhp(raw: &str) -> PowerReading {
    let bhp = BHP_ONLY
        .captures(raw)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .or_else(|| unparseable("bhp", raw));
    PowerReading { kw: None, bhp }
}

/// Splits "<text> (<remainder>)" into the text and the parenthetical.
///
/// Without a parenthesis the whole fragment is the text.
pub fn split_parenthetical(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    match raw.split_once('(') {
        Some((head, _)) => {
            let tail = raw.rsplit('(').next().unwrap_or_default();
            let tail = tail.trim().trim_end_matches(')').trim();
            let remainder = (!tail.is_empty()).then(|| tail.to_string());
            (head.trim().to_string(), remainder)
        }
        None => (raw.to_string(), None),
    }
}

/// Parses a calendar date in any of the formats the catalogue uses.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| unparseable("date", raw))
}

/// Parses a registration date carrying the remaining COE duration in brackets.
pub fn parse_registration(raw: &str) -> DatedFragment {
    let (date, remainder) = split_parenthetical(raw);
    DatedFragment { date: parse_date(&date), remainder }
}

/// Unit token trailing a mileage reading.
const MILEAGE_UNIT: &str = "km";

/// Parses mileage such as "45,000 km (8.2k /yr)" or "45,000km".
pub fn parse_mileage(raw: &str) -> Option<u32> {
    let reading = raw.split('(').next().unwrap_or_default().trim();
    let digits: String = reading
        .trim_end_matches(MILEAGE_UNIT)
        .chars()
        .filter(|c| !matches!(c, ',' | ' '))
        .collect();

    if digits.is_empty() {
        return unparseable("mileage", raw);
    }
    digits.parse::<u32>().ok().or_else(|| unparseable("mileage", raw))
}

/// Parses a yearly amount such as "$12,340 /yr".
pub fn parse_per_year(raw: &str) -> Option<f64> {
    let amount = raw.split("/yr").next().unwrap_or_default();
    parse_currency(amount)
}

/// Parses a money amount by keeping only digits and the decimal point.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() {
        return unparseable("currency", raw);
    }
    cleaned.parse().ok().or_else(|| unparseable("currency", raw))
}

/// Parses a count or capacity by keeping only digits.
pub fn parse_integer(raw: &str) -> Option<u32> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return unparseable("integer", raw);
    }
    cleaned.parse().ok().or_else(|| unparseable("integer", raw))
}

fn text(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| raw.to_string())
}

/// Builds a record from one new-catalogue variant row.
pub fn normalize_variant(
    fragments: &VariantFragments,
    brands: &BrandResolver,
    fuel_type: FuelType,
) -> VehicleRecord {
    let identity = brands.resolve(&fragments.title);
    let price = parse_listed_price(&fragments.price);
    let power = parse_bhp(&fragments.power);

    let mut record = VehicleRecord::new(
        identity.make,
        identity.model,
        fuel_type,
        fragments.link.clone().unwrap_or_default(),
    );
    record.specification = text(&fragments.specification);
    record.listed_price = price.amount;
    record.price_includes_levy = price.includes_levy;
    record.power_kw = power.kw;
    record.power_bhp = power.bhp;

    trace!(
        "Normalized variant {} / {:?}: price {:?} (with COE: {}), bhp {:?}",
        record.display_name(),
        record.specification,
        record.listed_price,
        record.price_includes_levy,
        record.power_bhp
    );
    record
}

/// Builds a record from a used-car detail page.
///
/// Used-car prices already include the remaining COE.
pub fn normalize_detail(
    fragments: &DetailFragments,
    brands: &BrandResolver,
    fuel_type: FuelType,
    link: &str,
) -> VehicleRecord {
    let identity = brands.resolve(&fragments.title);
    let mut record = VehicleRecord::new(identity.make, identity.model, fuel_type, link);

    record.listed_price = fragments.get("Price").and_then(parse_currency);
    record.depreciation_per_year = fragments.get("Depreciation").and_then(parse_per_year);
    record.road_tax_per_year = fragments.get("Road Tax").and_then(parse_per_year);
    record.mileage_km = fragments.get("Mileage").and_then(parse_mileage);
    record.dereg_value = fragments.get("Dereg Value").and_then(parse_currency);
    record.omv = fragments.get("OMV").and_then(parse_currency);
    record.coe = fragments.get("COE").and_then(parse_currency);
    record.arf = fragments.get("ARF").and_then(parse_currency);
    record.owner_count = fragments.get("No. of Owners").and_then(parse_integer);
    record.engine_capacity_cc =
        fragments.get_by_prefix("Engine Cap").and_then(parse_integer);
    record.body_type = fragments.get("Type of Vehicle").and_then(text);

    if let Some(raw) = fragments.get("Reg Date") {
        let registration = parse_registration(raw);
        record.registration_date = registration.date;
        record.levy_duration_remaining = registration.remainder;
    }

    let power = fragments.get("Power").map(parse_power).unwrap_or_default();
    record.power_kw = power.kw;
    record.power_bhp = power.bhp;

    trace!("Normalized detail {} from {}", record.display_name(), link);
    record
}
