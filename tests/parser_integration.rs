//! Integration tests for the HTML parsers using fixture files.

use vpes::coe::parse_benchmark;
use vpes::listing::normalize::{normalize_detail, normalize_variant};
use vpes::listing::{BrandResolver, FuelType, LevyCategory};
use vpes::sgcarmart::CatalogueParser;

const NEW_LISTING_FIXTURE: &str = include_str!("fixtures/new_listing.html");
const USED_DETAIL_FIXTURE: &str = include_str!("fixtures/used_detail.html");
const COE_FIXTURE: &str = include_str!("fixtures/coe_results.html");

fn brands() -> BrandResolver {
    BrandResolver::new(["Toyota", "Land Rover", "Honda", "Mazda"])
}

#[test]
fn test_parse_new_listing_fixture() {
    let parser = CatalogueParser::default();
    let variants = parser.parse_new_listing(NEW_LISTING_FIXTURE).unwrap();

    // POA and powerless rows are dropped
    assert_eq!(variants.len(), 2);

    let first = normalize_variant(&variants[0], &brands(), FuelType::Petrol);
    assert_eq!(first.make.as_deref(), Some("Toyota"));
    assert_eq!(first.model.as_deref(), Some("Corolla Altis"));
    assert_eq!(first.specification.as_deref(), Some("1.6A Standard"));
    assert_eq!(first.listed_price, Some(125888.0));
    assert!(!first.price_includes_levy);
    assert_eq!(first.power_bhp, Some(121));
    assert_eq!(
        first.source_link,
        "https://www.sgcarmart.com/newcars_overview.php?CarCode=12001"
    );

    let second = normalize_variant(&variants[1], &brands(), FuelType::Petrol);
    assert_eq!(second.listed_price, Some(131888.0));
    assert!(second.price_includes_levy);
}

#[test]
fn test_parse_model_titles_fixture() {
    let parser = CatalogueParser::default();
    let titles = parser.parse_model_titles(NEW_LISTING_FIXTURE).unwrap();
    assert_eq!(titles, vec!["Toyota Corolla Altis", "Land Rover Defender 110", "Honda Jazz"]);

    let models: Vec<String> = titles.iter().map(|t| brands().resolve(t).model).collect();
    assert_eq!(models, vec!["Corolla Altis", "Defender 110", "Jazz"]);
}

#[test]
fn test_parse_used_detail_fixture() {
    let parser = CatalogueParser::default();
    let link = "https://www.sgcarmart.com/used_cars/info.php?ID=1234567";
    let fragments = parser.parse_detail(USED_DETAIL_FIXTURE, link).unwrap();

    let record = normalize_detail(&fragments, &brands(), FuelType::Petrol, link);
    assert_eq!(record.make.as_deref(), Some("Mazda"));
    assert_eq!(record.model.as_deref(), Some("3 HB 1.5A Deluxe"));
    assert_eq!(record.listed_price, Some(78800.0));
    assert_eq!(record.depreciation_per_year, Some(9480.0));
    assert_eq!(record.registration_date.map(|d| d.to_string()), Some("2020-06-05".to_string()));
    assert_eq!(record.levy_duration_remaining.as_deref(), Some("4yrs 7mths 26days COE left"));
    assert_eq!(record.engine_capacity_cc, Some(1496));
    assert_eq!(record.dereg_value, Some(41200.0));
    assert_eq!(record.omv, Some(21345.0));
    assert_eq!(record.coe, Some(35001.0));
    assert_eq!(record.arf, Some(19883.0));
    assert_eq!(record.owner_count, Some(1));
    assert_eq!(record.mileage_km, Some(48500));
    assert_eq!(record.road_tax_per_year, Some(682.0));
    assert_eq!(record.power_kw, Some(88.0));
    assert_eq!(record.power_bhp, Some(118));
    assert_eq!(record.body_type.as_deref(), Some("Hatchback"));
    assert_eq!(record.source_link, link);
}

#[test]
fn test_parse_coe_fixture() {
    let benchmark = parse_benchmark(COE_FIXTURE, "https://www.motorist.sg/coe-results").unwrap();

    assert_eq!(benchmark.label, "October 2026 2nd Bidding Exercise");
    assert_eq!(benchmark.price_for(LevyCategory::A), Some(98889.0));
    assert_eq!(benchmark.price_for(LevyCategory::B), Some(115001.0));
    assert_eq!(benchmark.price_for(LevyCategory::C), Some(67390.0));
    assert_eq!(benchmark.price_for(LevyCategory::Unknown), None);
}

#[test]
fn test_parse_empty_pages() {
    let parser = CatalogueParser::default();
    let html = r#"
        <html>
        <body>
            <div class="no_result">No cars found</div>
        </body>
        </html>
    "#;

    assert!(parser.parse_new_listing(html).is_none());
    assert!(parser.parse_model_titles(html).is_none());
    assert!(parser.parse_used_links(html).is_none());
    assert!(parser.parse_detail(html, "link").unwrap_err().is_timeout());
}
