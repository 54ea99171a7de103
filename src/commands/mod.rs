//! CLI command implementations.

pub mod new_cars;
pub mod used_cars;

pub use new_cars::NewCarsCommand;
pub use used_cars::UsedCarsCommand;

use crate::coe::fetch_benchmark;
use crate::config::Config;
use crate::listing::{Annotation, BrandResolver, Cell, LevyBenchmark};
use crate::sgcarmart::{Catalogue, CatalogueParser, PageSource};
use tracing::{debug, info, warn};

/// Fetches listing pages `0..max_pages` until one yields no results or fails.
///
/// A failed page ends pagination for this query only; whatever was collected
/// so far is kept. With a `limit`, collection stops once that many items are in.
pub async fn collect_pages<T, U, P>(
    source: &impl PageSource,
    max_pages: u32,
    limit: Option<usize>,
    mut url_for_page: U,
    mut parse_page: P,
) -> Vec<T>
where
    U: FnMut(u32) -> String,
    P: FnMut(&str) -> Option<Vec<T>>,
{
    let mut items = Vec::new();

    for page in 0..max_pages {
        let url = url_for_page(page);
        debug!("Fetching page {}", page);

        let html = match source.fetch_listing_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Stopping pagination at page {}: {}", page, e);
                break;
            }
        };

        let Some(found) = parse_page(&html) else {
            debug!("No results on page {}, stopping", page);
            break;
        };

        debug!("Page {} returned {} items", page, found.len());
        items.extend(found);

        if let Some(limit) = limit {
            if items.len() >= limit {
                items.truncate(limit);
                break;
            }
        }
    }

    items
}

/// Fetches the brand list. A failed fetch leaves the resolver empty, so
/// titles fall back to first-word splitting.
pub async fn load_brands(
    source: &impl PageSource,
    catalogue: &Catalogue,
    parser: &CatalogueParser,
) -> BrandResolver {
    match source.fetch_listing_page(&catalogue.brands_url()).await {
        Ok(html) => {
            let brands = BrandResolver::new(parser.parse_brands(&html));
            info!("Loaded {} brands", brands.brands().len());
            brands
        }
        Err(e) => {
            warn!("Brand list unavailable, falling back to first-word makes: {}", e);
            BrandResolver::default()
        }
    }
}

/// Fetches the COE benchmark, or logs and returns `None`.
pub async fn load_benchmark(source: &impl PageSource, config: &Config) -> Option<LevyBenchmark> {
    match fetch_benchmark(source, &config.benchmark_url).await {
        Ok(benchmark) => Some(benchmark),
        Err(e) => {
            warn!("COE prices unavailable, prices without COE stay NIL: {}", e);
            None
        }
    }
}

/// Report annotations: the benchmark, when known, and the run timestamp.
pub fn run_annotations(benchmark: Option<&LevyBenchmark>) -> Vec<Annotation> {
    let mut annotations = Vec::new();

    if let Some(benchmark) = benchmark {
        annotations.push(Annotation::new(
            "COE Car Prices as of",
            Cell::Text(benchmark.label.clone()),
        ));
        annotations.push(Annotation::new("Cat A (SGD)", Cell::Money(benchmark.category_a)));
        annotations.push(Annotation::new("Cat B (SGD)", Cell::Money(benchmark.category_b)));
        annotations.push(Annotation::new("Cat C (SGD)", Cell::Money(benchmark.category_c)));
    }

    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    annotations.push(Annotation::new("Generated at", Cell::Text(generated)));

    annotations
}
