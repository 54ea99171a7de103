//! New-catalogue run: every variant of every fuel type, classified and priced.

use crate::commands::{collect_pages, load_benchmark, load_brands, run_annotations};
use crate::config::Config;
use crate::format::Formatter;
use crate::listing::normalize::normalize_variant;
use crate::listing::reconcile::reconcile;
use crate::listing::{
    CatalogueFlow, CommercialModels, FuelType, ListingAggregator, PendingListings, Report, Schema,
};
use crate::sgcarmart::{Catalogue, CatalogueClient, CatalogueParser, NewCarQuery, PageSource};
use anyhow::{Context, Result};
use tracing::{debug, info};

/// Scrapes the new-car catalogue into a report grouped by fuel type.
pub struct NewCarsCommand {
    config: Config,
    fuels: Vec<FuelType>,
    max_pages: Option<u32>,
}

impl NewCarsCommand {
    /// Creates a command covering every fuel type.
    pub fn new(config: Config) -> Self {
        Self { config, fuels: FuelType::all().to_vec(), max_pages: None }
    }

    /// Restricts the run to the given fuel types. An empty list keeps all.
    pub fn with_fuels(mut self, fuels: Vec<FuelType>) -> Self {
        if !fuels.is_empty() {
            self.fuels = fuels;
        }
        self
    }

    /// Caps the pages fetched per query, below the configured bound.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    fn page_limit(&self) -> u32 {
        match self.max_pages {
            Some(pages) => pages.min(self.config.max_pages),
            None => self.config.max_pages,
        }
    }

    /// Executes the run and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        let client =
            CatalogueClient::new(&self.config).await.context("Failed to create HTTP client")?;

        Ok(self.execute_with_source(&client).await)
    }

    /// Executes the run against a provided page source (for testing).
    pub async fn execute_with_source(&self, source: &impl PageSource) -> String {
        let report = self.run(source).await;
        Formatter::new(self.config.format).format_report(&report)
    }

    /// Runs the pipeline and returns the unformatted report.
    pub async fn run(&self, source: &impl PageSource) -> Report {
        let catalogue = Catalogue::new(&self.config.catalogue_base_url);
        let parser = CatalogueParser::new(catalogue.clone());
        let page_size = self.config.new_page_size;
        let max_pages = self.page_limit();

        let brands = load_brands(source, &catalogue, &parser).await;

        // Pass 1 over every variant row
        let mut pending = PendingListings::new();
        for &fuel in &self.fuels {
            for query in NewCarQuery::all_for(fuel) {
                info!("Scraping new {} cars", query);

                let variants = collect_pages(
                    source,
                    max_pages,
                    None,
                    |page| catalogue.new_listing_url(&query, page * page_size, page_size),
                    |html| parser.parse_new_listing(html),
                )
                .await;

                debug!("{}: {} variants", query, variants.len());
                for variant in &variants {
                    let record = normalize_variant(variant, &brands, fuel);
                    pending.admit(fuel.label(), record, CatalogueFlow::New { band: query.band });
                }
            }
        }

        info!("Scraping commercial vehicle models");
        let titles = collect_pages(
            source,
            max_pages,
            None,
            |page| catalogue.commercial_listing_url(page * page_size, page_size),
            |html| parser.parse_model_titles(html),
        )
        .await;
        let commercial: CommercialModels =
            titles.iter().map(|title| brands.resolve(title).model).collect();
        info!("Found {} commercial models", commercial.len());

        // Barrier: every listing is in before Pass 2 runs
        let classified = pending.finalize(&commercial);
        info!(
            "Classified {} variants ({} commercial overrides)",
            classified.len(),
            classified.overridden()
        );

        let benchmark = load_benchmark(source, &self.config).await;

        let mut aggregator = ListingAggregator::new(Schema::NewCatalogue);
        for fuel in &self.fuels {
            aggregator.declare_group(fuel.label());
        }
        for (group, mut record) in classified {
            reconcile(&mut record, benchmark.as_ref());
            aggregator.push(&group, record);
        }

        aggregator.finish(run_annotations(benchmark.as_ref()))
    }
}
