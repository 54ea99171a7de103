//! COE results page: latest quota premium per category.

use crate::coe::selectors;
use crate::error::FetchError;
use crate::listing::normalize::parse_currency;
use crate::listing::reconcile::LevyBenchmark;
use crate::sgcarmart::client::PageSource;
use scraper::{ElementRef, Html};
use tracing::{debug, info};

const FALLBACK_LABEL: &str = "latest";

/// Extracts the latest Cat A/B/C premiums and the bidding-round label.
///
/// The label degrades to "latest" when the page has no heading; a missing
/// premium is a hard failure.
pub fn parse_benchmark(html: &str, url: &str) -> Result<LevyBenchmark, FetchError> {
    let document = Html::parse_document(html);

    let month = document
        .select(&selectors::MONTH)
        .next()
        .or_else(|| document.select(&selectors::HEADING).next())
        .map(text_of)
        .filter(|t| !t.is_empty());
    let round = document.select(&selectors::ROUND).next().map(text_of).filter(|t| !t.is_empty());

    let label = match (month, round) {
        (Some(month), Some(round)) => format!("{} {}", month, round),
        (Some(month), None) => month,
        (None, Some(round)) => round,
        (None, None) => FALLBACK_LABEL.to_string(),
    };

    let row = document
        .select(&selectors::RESULT_ROW)
        .next()
        .ok_or_else(|| FetchError::hard(url, "COE results table not found"))?;

    // First cell is the round date, then categories A, B and C
    let premiums: Vec<Option<f64>> =
        row.select(&selectors::CELL).skip(1).take(3).map(|td| parse_currency(&text_of(td))).collect();

    let premium = |index: usize, category: &str| {
        premiums
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| FetchError::hard(url, format!("no Cat {} premium on COE results page", category)))
    };

    let benchmark = LevyBenchmark::new(premium(0, "A")?, premium(1, "B")?, premium(2, "C")?, label);
    debug!("Parsed COE benchmark: {:?}", benchmark);
    Ok(benchmark)
}

/// Fetches and parses the COE results page.
pub async fn fetch_benchmark(source: &dyn PageSource, url: &str) -> Result<LevyBenchmark, FetchError> {
    let html = source.fetch_listing_page(url).await?;
    let benchmark = parse_benchmark(&html, url)?;
    info!(
        "COE prices as of {}: A={:.0} B={:.0} C={:.0}",
        benchmark.label, benchmark.category_a, benchmark.category_b, benchmark.category_c
    );
    Ok(benchmark)
}

fn text_of(element: ElementRef) -> String {
    element.text().map(str::trim).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const URL: &str = "https://www.motorist.sg/coe-results";

    const RESULTS: &str = r#"
        <html><body><main>
          <div>
            <h2><span>COE Results</span> <span>October 2026</span></h2>
            <p>2nd Bidding</p>
          </div>
          <table>
            <tbody>
              <tr><td>Round</td><td>Cat A</td><td>Cat B</td><td>Cat C</td><td>Cat E</td></tr>
              <tr><td>15 Oct</td><td><p>$90,000</p></td><td><p>$120,000</p></td><td><p>$50,000</p></td><td><p>$121,000</p></td></tr>
              <tr><td>1 Oct</td><td><p>$88,000</p></td><td><p>$118,000</p></td><td><p>$49,000</p></td><td><p>$119,000</p></td></tr>
            </tbody>
          </table>
        </main></body></html>
    "#;

    #[test]
    fn test_parse_benchmark() {
        let benchmark = parse_benchmark(RESULTS, URL).unwrap();
        assert_eq!(benchmark.category_a, 90000.0);
        assert_eq!(benchmark.category_b, 120000.0);
        assert_eq!(benchmark.category_c, 50000.0);
        assert_eq!(benchmark.label, "October 2026 2nd Bidding");
    }

    #[test]
    fn test_parse_benchmark_label_fallback() {
        let html = r#"<main><table><tbody>
            <tr><td>h</td><td>A</td><td>B</td><td>C</td></tr>
            <tr><td>r</td><td>$1,000</td><td>$2,000</td><td>$3,000</td></tr>
        </tbody></table></main>"#;

        let benchmark = parse_benchmark(html, URL).unwrap();
        assert_eq!(benchmark.label, "latest");
        assert_eq!(benchmark.category_c, 3000.0);
    }

    #[test]
    fn test_parse_benchmark_missing_table() {
        let err = parse_benchmark("<main><h2>COE</h2></main>", URL).unwrap_err();
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("table not found"));
    }

    #[test]
    fn test_parse_benchmark_missing_premium() {
        let html = r#"<main><table><tbody>
            <tr><td>h</td></tr>
            <tr><td>r</td><td>$1,000</td><td>-</td></tr>
        </tbody></table></main>"#;

        let err = parse_benchmark(html, URL).unwrap_err();
        assert!(err.to_string().contains("Cat B"));
    }

    struct FixedPage(&'static str);

    #[async_trait]
    impl PageSource for FixedPage {
        async fn fetch_listing_page(&self, _url: &str) -> Result<String, FetchError> {
            Ok(self.0.to_string())
        }

        async fn fetch_detail_page(&self, url: &str) -> Result<String, FetchError> {
            Err(FetchError::hard(url, "unexpected detail fetch"))
        }
    }

    #[tokio::test]
    async fn test_fetch_benchmark() {
        let benchmark = fetch_benchmark(&FixedPage(RESULTS), URL).await.unwrap();
        assert_eq!(benchmark.price_for(crate::listing::LevyCategory::A), Some(90000.0));
    }
}
