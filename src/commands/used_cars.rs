//! Used-catalogue run: detail pages per fuel group, one row per listing.

use crate::commands::{collect_pages, load_benchmark, load_brands, run_annotations};
use crate::config::Config;
use crate::error::FetchError;
use crate::format::Formatter;
use crate::listing::normalize::normalize_detail;
use crate::listing::reconcile::reconcile;
use crate::listing::{
    CatalogueFlow, CommercialModels, ListingAggregator, PendingListings, Report, RetryController,
    Schema,
};
use crate::sgcarmart::{Catalogue, CatalogueClient, CatalogueParser, PageSource, UsedGroup};
use anyhow::{Context, Result};
use tracing::info;

/// Scrapes used-car detail pages into one report group per fuel group.
pub struct UsedCarsCommand {
    config: Config,
    groups: Vec<UsedGroup>,
    max_pages: Option<u32>,
    limit: Option<usize>,
}

impl UsedCarsCommand {
    /// Creates a command covering Petrol, Hybrid and EV listings.
    pub fn new(config: Config) -> Self {
        Self { config, groups: UsedGroup::all().to_vec(), max_pages: None, limit: None }
    }

    /// Restricts the run to the given groups. An empty list keeps all.
    pub fn with_groups(mut self, groups: Vec<UsedGroup>) -> Self {
        if !groups.is_empty() {
            self.groups = groups;
        }
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Caps the number of listings per group.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
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
        let retry = RetryController::new(self.config.max_retries);
        let page_size = self.config.used_page_size;

        let brands = load_brands(source, &catalogue, &parser).await;

        let mut pending = PendingListings::new();
        for &group in &self.groups {
            info!("Scraping used {} cars", group);

            let links = collect_pages(
                source,
                self.page_limit(),
                self.limit,
                |page| catalogue.used_listing_url(group, page * page_size, page_size),
                |html| parser.parse_used_links(html),
            )
            .await;
            info!("{}: {} listings", group, links.len());

            let sheet = group.sheet_name();
            let fuel = group.fuel_type();
            let parser = &parser;
            let brands = &brands;

            for link in &links {
                let link = link.as_str();
                let record = retry
                    .fetch_detail_or_placeholder(link, move || async move {
                        let html = source.fetch_detail_page(link).await?;
                        let fragments = parser.parse_detail(&html, link)?;
                        Ok::<_, FetchError>(normalize_detail(&fragments, brands, fuel, link))
                    })
                    .await;

                pending.admit(&sheet, record, CatalogueFlow::Used);
            }
        }

        // The used catalogue has no commercial listing to check against
        let classified = pending.finalize(&CommercialModels::default());
        info!("Classified {} used listings", classified.len());

        let benchmark = load_benchmark(source, &self.config).await;

        let mut aggregator = ListingAggregator::new(Schema::UsedCatalogue);
        for group in &self.groups {
            aggregator.declare_group(&group.sheet_name());
        }
        for (group, mut record) in classified {
            reconcile(&mut record, benchmark.as_ref());
            aggregator.push(&group, record);
        }

        aggregator.finish(run_annotations(benchmark.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Cell;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Mock page source: listing pages by URL, detail pages by URL with an
    /// optional number of not-ready responses served first.
    struct MockUsedCatalogue {
        listings: HashMap<String, String>,
        details: HashMap<String, String>,
        not_ready: HashMap<String, u32>,
        detail_call_count: Arc<AtomicU32>,
    }

    impl MockUsedCatalogue {
        fn new() -> Self {
            Self {
                listings: HashMap::new(),
                details: HashMap::new(),
                not_ready: HashMap::new(),
                detail_call_count: Arc::new(AtomicU32::new(0)),
            }
        }

        fn with_listing(mut self, url: String, html: String) -> Self {
            self.listings.insert(url, html);
            self
        }

        fn with_detail(mut self, url: &str, html: &str) -> Self {
            self.details.insert(url.to_string(), html.to_string());
            self
        }

        fn with_not_ready(mut self, url: &str, times: u32) -> Self {
            self.not_ready.insert(url.to_string(), times);
            self
        }

        fn detail_calls(&self) -> u32 {
            self.detail_call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageSource for MockUsedCatalogue {
        async fn fetch_listing_page(&self, url: &str) -> Result<String, FetchError> {
            Ok(self.listings.get(url).cloned().unwrap_or_else(|| "<html></html>".to_string()))
        }

        async fn fetch_detail_page(&self, url: &str) -> Result<String, FetchError> {
            let n = self.detail_call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(&times) = self.not_ready.get(url) {
                if n < times {
                    return Ok("<html><body>Loading...</body></html>".to_string());
                }
            }
            self.details.get(url).cloned().ok_or_else(|| FetchError::hard(url, "HTTP 404"))
        }
    }

    const VEZEL: &str = r#"<html><body>
        <a class="globaltitle" href="/">Honda Vezel 1.5A X</a>
        <table>
          <tr><td class="label">Price</td><td>$99,800</td></tr>
          <tr><td class="label">Depreciation</td><td>$10,920 /yr</td></tr>
          <tr><td class="label">Reg Date</td><td>12-Mar-2019 (2yrs 5mths COE left)</td></tr>
          <tr><td class="label">Engine Cap</td><td>1,496 cc</td></tr>
        </table>
        <div class="row_title">Mileage</div><div class="row_info">62,000 km</div>
        <div class="row_title">Power</div><div class="row_info">96.0 kW (128 bhp)</div>
        <div class="row_title">Type of Vehicle</div><div class="row_info">SUV</div>
        </body></html>"#;

    const ATTO: &str = r#"<html><body>
        <a class="globaltitle" href="/">BYD Atto 3 Electric</a>
        <table>
          <tr><td class="label">Price</td><td>$120,000</td></tr>
        </table>
        <div class="row_title">Power</div><div class="row_info">150.0 kW (201 bhp)</div>
        </body></html>"#;

    const BRANDS: &str = r#"<div id="rightside_content"><table><tr>
        <td><a href="/b1">BYD cars</a></td><td><a href="/b2">Honda cars</a></td>
    </tr></table></div>"#;

    fn make_test_config() -> Config {
        Config { delay_ms: 0, delay_jitter_ms: 0, max_pages: 2, ..Config::default() }
    }

    fn listing_page(links: &[&str]) -> String {
        let mut html = String::from("<html><body>");
        for link in links {
            html.push_str(&format!(r#"<a class="car-model-title" href="{}">x</a>"#, link));
        }
        html.push_str("</body></html>");
        html
    }

    fn url(catalogue: &Catalogue, path: &str) -> String {
        catalogue.absolute(path)
    }

    fn make_source(config: &Config) -> MockUsedCatalogue {
        let catalogue = Catalogue::new(&config.catalogue_base_url);
        let size = config.used_page_size;

        MockUsedCatalogue::new()
            .with_listing(catalogue.brands_url(), BRANDS.to_string())
            .with_listing(
                catalogue.used_listing_url(UsedGroup::Petrol, 0, size),
                listing_page(&["/used_cars/info.php?ID=1", "/used_cars/info.php?ID=2"]),
            )
            .with_listing(
                catalogue.used_listing_url(UsedGroup::Ev, 0, size),
                listing_page(&["/used_cars/info.php?ID=3"]),
            )
            .with_detail(&url(&catalogue, "/used_cars/info.php?ID=1"), VEZEL)
            .with_detail(&url(&catalogue, "/used_cars/info.php?ID=3"), ATTO)
    }

    fn column(report: &Report, group: &str, row: usize, header: &str) -> Cell {
        let group = report.group(group).unwrap();
        let index = group.columns.iter().position(|c| c == header).unwrap();
        group.rows[row][index].clone()
    }

    #[tokio::test]
    async fn test_used_cars_run() {
        let config = make_test_config();
        let source = make_source(&config);

        let cmd = UsedCarsCommand::new(config);
        let report = cmd.run(&source).await;

        let names: Vec<_> = report.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Petrol Used Cars", "Hybrid Used Cars", "EV Used Cars"]);
        assert_eq!(report.total_rows(), 3);

        assert_eq!(column(&report, "Petrol Used Cars", 0, "Make"), Cell::Text("Honda".into()));
        assert_eq!(column(&report, "Petrol Used Cars", 0, "Model"), Cell::Text("Vezel 1.5A X".into()));
        assert_eq!(column(&report, "Petrol Used Cars", 0, "COE Category"), Cell::Text("A".into()));
        assert_eq!(
            column(&report, "Petrol Used Cars", 0, "Registration Date"),
            Cell::Text("12-Mar-2019".into())
        );
        assert_eq!(column(&report, "Petrol Used Cars", 0, "Vehicle Type"), Cell::Text("SUV".into()));

        assert_eq!(column(&report, "EV Used Cars", 0, "COE Category"), Cell::Text("B".into()));
        assert!(report.group("Hybrid Used Cars").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_used_cars_unreadable_listing_is_nil_row() {
        let config = make_test_config();
        let source = make_source(&config);

        let cmd = UsedCarsCommand::new(config).with_groups(vec![UsedGroup::Petrol]);
        let report = cmd.run(&source).await;

        // ID=2 has no detail page: a full row of NIL except the link
        let group = report.group("Petrol Used Cars").unwrap();
        assert_eq!(group.len(), 2);
        let row = &group.rows[1];
        assert_eq!(row.len(), Schema::UsedCatalogue.columns().len());
        assert!(column(&report, "Petrol Used Cars", 1, "Make").is_nil());
        assert!(column(&report, "Petrol Used Cars", 1, "COE Category").is_nil());
        assert_eq!(
            column(&report, "Petrol Used Cars", 1, "Link"),
            Cell::Text("https://www.sgcarmart.com/used_cars/info.php?ID=2".into())
        );
    }

    #[tokio::test]
    async fn test_used_cars_retries_not_ready_page() {
        let config = make_test_config();
        let catalogue = Catalogue::new(&config.catalogue_base_url);
        let link = url(&catalogue, "/used_cars/info.php?ID=3");
        let source = make_source(&config).with_not_ready(&link, 2);

        let cmd = UsedCarsCommand::new(config).with_groups(vec![UsedGroup::Ev]);
        let report = cmd.run(&source).await;

        assert_eq!(source.detail_calls(), 3);
        assert_eq!(column(&report, "EV Used Cars", 0, "Make"), Cell::Text("BYD".into()));
    }

    #[tokio::test]
    async fn test_used_cars_gives_up_after_max_retries() {
        let config = make_test_config();
        let catalogue = Catalogue::new(&config.catalogue_base_url);
        let link = url(&catalogue, "/used_cars/info.php?ID=3");
        let source = make_source(&config).with_not_ready(&link, 10);

        let cmd = UsedCarsCommand::new(config).with_groups(vec![UsedGroup::Ev]);
        let report = cmd.run(&source).await;

        assert_eq!(source.detail_calls(), 3);
        assert!(column(&report, "EV Used Cars", 0, "Make").is_nil());
    }

    #[tokio::test]
    async fn test_used_cars_limit() {
        let config = make_test_config();
        let source = make_source(&config);

        let cmd = UsedCarsCommand::new(config)
            .with_groups(vec![UsedGroup::Petrol])
            .with_limit(Some(1));
        let report = cmd.run(&source).await;

        assert_eq!(report.total_rows(), 1);
        assert_eq!(source.detail_calls(), 1);
    }
}
