//! HTTP page source for catalogue and COE pages.

use crate::config::Config;
use crate::error::FetchError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Page retrieval seam. Tests substitute canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches a listing (or any index) page.
    async fn fetch_listing_page(&self, url: &str) -> Result<String, FetchError>;

    /// Fetches a single listing's detail page.
    async fn fetch_detail_page(&self, url: &str) -> Result<String, FetchError>;
}

/// Sequential HTTP client with a politeness delay.
pub struct CatalogueClient {
    client: Client,
    delay_ms: u64,
    delay_jitter_ms: u64,
    timeout: Duration,
}

impl CatalogueClient {
    /// Creates a new client with the given configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Performs a GET request. The whole exchange, body included, is bounded
    /// by the request timeout.
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.delay().await;

        debug!("GET {}", url);

        match tokio::time::timeout(self.timeout, self.exchange(url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Timed out after {:?}: {}", self.timeout, url);
                Err(FetchError::timeout(url))
            }
        }
    }

    async fn exchange(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-SG,en;q=0.9")
            .send()
            .await
            .map_err(|e| transport_error(url, "request failed", e))?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        if status == 408 || status == 504 {
            warn!("Server timed out on {} ({})", url, status);
            return Err(FetchError::timeout(url));
        }

        if !(200..300).contains(&status) {
            return Err(FetchError::hard(url, format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| transport_error(url, "failed to read body", e))
    }

    /// Waits the configured delay plus random jitter.
    async fn delay(&self) {
        if self.delay_ms == 0 && self.delay_jitter_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }

    /// Updates the delay settings.
    pub fn set_delay(&mut self, delay_ms: u64, jitter_ms: u64) {
        self.delay_ms = delay_ms;
        self.delay_jitter_ms = jitter_ms;
    }

    /// Updates the per-request timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

/// Transport timeouts (connect, read or total) stay retryable; anything else is hard.
fn transport_error(url: &str, context: &str, err: wreq::Error) -> FetchError {
    if err.is_timeout() {
        warn!("Transport timeout on {}: {}", url, err);
        FetchError::timeout(url)
    } else {
        FetchError::hard(url, format!("{}: {}", context, err))
    }
}

#[async_trait]
impl PageSource for CatalogueClient {
    async fn fetch_listing_page(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching listing page: {}", url);
        self.get(url).await
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<String, FetchError> {
        debug!("Fetching detail page: {}", url);
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_test_config() -> Config {
        Config {
            delay_ms: 0,        // No delay for tests
            delay_jitter_ms: 0, // No jitter for tests
            ..Config::default()
        }
    }

    async fn make_client() -> CatalogueClient {
        CatalogueClient::new(&make_test_config()).await.unwrap()
    }

    #[tokio::test]
    async fn test_fetch_listing_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/new_cars/newcars_listing.php"))
            .and(query_param("BRSR", "60"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>page 2</html>"))
            .mount(&mock_server)
            .await;

        let client = make_client().await;
        let url = format!("{}/new_cars/newcars_listing.php?VT=Electric&RPG=60&BRSR=60", mock_server.uri());

        let body = client.fetch_listing_page(&url).await.unwrap();
        assert!(body.contains("page 2"));
    }

    #[tokio::test]
    async fn test_fetch_detail_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/used_cars/info.php"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"<a class="globaltitle">Honda Vezel</a>"#),
            )
            .mount(&mock_server)
            .await;

        let client = make_client().await;
        let url = format!("{}/used_cars/info.php?ID=1", mock_server.uri());

        let body = client.fetch_detail_page(&url).await.unwrap();
        assert!(body.contains("Honda Vezel"));
    }

    #[tokio::test]
    async fn test_http_404_is_hard() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = make_client().await;
        let url = format!("{}/missing", mock_server.uri());

        let err = client.fetch_detail_page(&url).await.unwrap_err();
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("404"));
        assert_eq!(err.url(), url);
    }

    #[tokio::test]
    async fn test_http_500_is_hard() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = make_client().await;
        let err = client.fetch_listing_page(&mock_server.uri()).await.unwrap_err();
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_gateway_timeout_is_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(504))
            .mount(&mock_server)
            .await;

        let client = make_client().await;
        let err = client.fetch_detail_page(&mock_server.uri()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_slow_response_is_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let mut client = make_client().await;
        client.set_timeout(Duration::from_millis(200));

        let err = client.fetch_detail_page(&mock_server.uri()).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_transport_timeout_is_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("too late")
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        // The transport gives up well before the overall request timeout
        let client = CatalogueClient {
            client: Client::builder().timeout(Duration::from_millis(200)).build().unwrap(),
            delay_ms: 0,
            delay_jitter_ms: 0,
            timeout: Duration::from_secs(30),
        };

        let err = client.fetch_detail_page(&mock_server.uri()).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.url(), mock_server.uri());
    }

    #[tokio::test]
    async fn test_empty_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let client = make_client().await;
        let body = client.fetch_listing_page(&mock_server.uri()).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_set_delay() {
        let mut client = make_client().await;

        client.set_delay(1000, 500);
        assert_eq!(client.delay_ms, 1000);
        assert_eq!(client.delay_jitter_ms, 500);
    }

    #[tokio::test]
    async fn test_timeout_from_config() {
        let config = Config { request_timeout_secs: 42, ..make_test_config() };
        let client = CatalogueClient::new(&config).await.unwrap();
        assert_eq!(client.timeout, Duration::from_secs(42));
    }
}
