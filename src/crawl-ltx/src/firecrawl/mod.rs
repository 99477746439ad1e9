//! Client for the Firecrawl scraping API: site mapping (URL discovery) and single-page scraping.

pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Public Firecrawl endpoint.
pub const DEFAULT_API_URL: &str = "https://api.firecrawl.dev/v1";

/// How long Firecrawl may spend rendering a single page, in milliseconds.
const SCRAPE_TIMEOUT_MS: u64 = 30_000;

/// Errors from calling the scraping API.
#[derive(Debug, Error)]
pub enum FirecrawlError {
    /// Transport failure, including client-side timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success HTTP status.
    #[error("API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The API answered 2xx but reported `success: false` or an incomplete payload.
    #[error("API reported failure: {0}")]
    Unsuccessful(String),

    /// The page was scraped but had no markdown content.
    #[error("Scraped page has no content")]
    EmptyContent,
}

/// A scraped page: its markdown, the raw HTML (when returned) and Firecrawl's metadata map.
#[derive(Debug, Clone, Default)]
pub struct ScrapedPage {
    pub url: String,
    pub markdown: String,
    pub raw_html: Option<String>,
    pub metadata: Map<String, Value>,
}

impl ScrapedPage {
    /// HTTP status of the underlying page, as reported by Firecrawl.
    pub fn status_code(&self) -> Option<u16> {
        self.metadata
            .get("statusCode")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
    }
}

/// Interface to a scraping backend: lists a site's URLs and fetches single pages.
#[async_trait]
pub trait ScrapeApi: Send + Sync {
    /// All known URLs for the site, in the order the backend reports them.
    async fn map_website(&self, url: &str, limit: usize) -> Result<Vec<String>, FirecrawlError>;

    /// Markdown + metadata for one page.
    async fn scrape_url(&self, url: &str) -> Result<ScrapedPage, FirecrawlError>;
}

/// Firecrawl over HTTP.
#[derive(Debug, Clone)]
pub struct Firecrawl {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Firecrawl {
    /// Every request made through this client gives up after `timeout`.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, FirecrawlError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<R, FirecrawlError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FirecrawlError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapRequest<'a> {
    url: &'a str,
    limit: usize,
    include_subdomains: bool,
    ignore_sitemap: bool,
}

/// Newer API versions report links as objects rather than bare strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MapLink {
    Url(String),
    Entry { url: String },
}

impl MapLink {
    fn into_url(self) -> String {
        match self {
            MapLink::Url(url) | MapLink::Entry { url } => url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    links: Vec<MapLink>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 2],
    only_main_content: bool,
    timeout: u64,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    raw_html: Option<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[async_trait]
impl ScrapeApi for Firecrawl {
    async fn map_website(&self, url: &str, limit: usize) -> Result<Vec<String>, FirecrawlError> {
        tracing::info!("Mapping website: {} (limit: {})", url, limit);

        let response: MapResponse = self
            .post(
                "map",
                &MapRequest {
                    url,
                    limit,
                    include_subdomains: false,
                    ignore_sitemap: false,
                },
            )
            .await?;

        if !response.success {
            return Err(FirecrawlError::Unsuccessful(
                response.error.unwrap_or_else(|| "map request was not successful".to_string()),
            ));
        }

        let urls: Vec<String> = response.links.into_iter().map(MapLink::into_url).collect();
        tracing::info!("Found {} URLs", urls.len());
        Ok(urls)
    }

    async fn scrape_url(&self, url: &str) -> Result<ScrapedPage, FirecrawlError> {
        tracing::debug!("Scraping URL: {}", url);

        let response: ScrapeResponse = self
            .post(
                "scrape",
                &ScrapeRequest {
                    url,
                    formats: ["markdown", "rawHtml"],
                    only_main_content: true,
                    timeout: SCRAPE_TIMEOUT_MS,
                },
            )
            .await?;

        let data = match (response.success, response.data) {
            (true, Some(data)) => data,
            _ => {
                return Err(FirecrawlError::Unsuccessful(
                    response.error.unwrap_or_else(|| "scrape returned no data".to_string()),
                ));
            }
        };

        let markdown = data.markdown.unwrap_or_default();
        if markdown.trim().is_empty() {
            return Err(FirecrawlError::EmptyContent);
        }

        Ok(ScrapedPage {
            url: url.to_string(),
            markdown,
            raw_html: data.raw_html,
            metadata: data.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Firecrawl {
        Firecrawl::new("fc-test", &format!("{}/v1", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_map_website() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/map"))
            .and(header("authorization", "Bearer fc-test"))
            .and(body_partial_json(json!({"url": "https://ex.com", "limit": 50, "includeSubdomains": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "links": ["https://ex.com/", "https://ex.com/docs/a"]
            })))
            .mount(&server)
            .await;

        let urls = client(&server).map_website("https://ex.com", 50).await.unwrap();
        assert_eq!(urls, vec!["https://ex.com/", "https://ex.com/docs/a"]);
    }

    #[tokio::test]
    async fn test_map_website_link_objects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/map"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "links": [{"url": "https://ex.com/a", "title": "A"}, "https://ex.com/b"]
            })))
            .mount(&server)
            .await;

        let urls = client(&server).map_website("https://ex.com", 10).await.unwrap();
        assert_eq!(urls, vec!["https://ex.com/a", "https://ex.com/b"]);
    }

    #[tokio::test]
    async fn test_map_website_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/map"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized: Invalid token"))
            .mount(&server)
            .await;

        let result = client(&server).map_website("https://ex.com", 10).await;
        match result {
            Err(FirecrawlError::Status { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("Invalid token"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scrape_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .and(body_partial_json(json!({"url": "https://ex.com/docs/a", "onlyMainContent": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "markdown": "# Docs A\n\nBody",
                    "rawHtml": "<html><head><title>Docs A</title></head></html>",
                    "metadata": {"title": "Docs A", "statusCode": 200}
                }
            })))
            .mount(&server)
            .await;

        let page = client(&server).scrape_url("https://ex.com/docs/a").await.unwrap();
        assert_eq!(page.url, "https://ex.com/docs/a");
        assert_eq!(page.markdown, "# Docs A\n\nBody");
        assert!(page.raw_html.as_deref().unwrap().contains("<title>Docs A</title>"));
        assert_eq!(page.status_code(), Some(200));
    }

    #[tokio::test]
    async fn test_scrape_url_empty_markdown() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"markdown": "   ", "metadata": {}}
            })))
            .mount(&server)
            .await;

        let result = client(&server).scrape_url("https://ex.com/empty").await;
        assert!(matches!(result, Err(FirecrawlError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_scrape_url_unsuccessful() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "Page blocked"
            })))
            .mount(&server)
            .await;

        let result = client(&server).scrape_url("https://ex.com/blocked").await;
        match result {
            Err(FirecrawlError::Unsuccessful(msg)) => assert_eq!(msg, "Page blocked"),
            other => panic!("expected unsuccessful error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scrape_url_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/scrape"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": true, "data": {"markdown": "late"}}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let slow = Firecrawl::new("fc-test", &format!("{}/v1", server.uri()), Duration::from_millis(50)).unwrap();
        let result = slow.scrape_url("https://ex.com/slow").await;
        assert!(matches!(result, Err(FirecrawlError::Http(_))));
    }
}
