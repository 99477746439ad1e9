//! Mock scraping backend for testing
//!
//! This module provides a mock implementation of the `ScrapeApi` trait
//! that serves pages from memory, without making real API calls.
//! It records every scrape so tests can check batching and concurrency.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::firecrawl::{FirecrawlError, ScrapeApi, ScrapedPage};

/// What the mock observed while scraping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeEvent {
    Started(String),
    Finished(String),
}

/// Mock scraping backend
///
/// Can be configured to:
/// - Return a fixed URL list from `map_website`
/// - Serve specific pages, or a generated page for any URL
/// - Fail specific URLs
/// - Delay specific URLs to shuffle completion order
#[derive(Default)]
pub struct MockScrapeApi {
    map_urls: Vec<String>,
    map_failure: Option<String>,
    pages: HashMap<String, ScrapedPage>,
    serve_any: bool,
    failing: HashSet<String>,
    latency: HashMap<String, Duration>,
    events: Mutex<Vec<ScrapeEvent>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockScrapeApi {
    /// Create a mock that discovers nothing and serves nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock whose `map_website` returns these URLs, each of which scrapes successfully
    pub fn with_site(urls: &[&str]) -> Self {
        let mut mock = Self::new();
        mock.map_urls = urls.iter().map(|u| u.to_string()).collect();
        mock.serve_any = true;
        mock
    }

    /// Create a mock whose `map_website` always fails
    pub fn with_map_failure(message: &str) -> Self {
        let mut mock = Self::new();
        mock.map_failure = Some(message.to_string());
        mock
    }

    /// Serve a generated page for any URL that has no explicit page configured
    pub fn serve_any(mut self) -> Self {
        self.serve_any = true;
        self
    }

    /// Serve this exact page for its URL
    pub fn add_page(&mut self, page: ScrapedPage) {
        self.pages.insert(page.url.clone(), page);
    }

    /// Make scraping this URL fail
    pub fn add_failure(&mut self, url: &str) {
        self.failing.insert(url.to_string());
    }

    /// Delay the scrape of this URL
    pub fn set_latency(&mut self, url: &str, delay: Duration) {
        self.latency.insert(url.to_string(), delay);
    }

    /// Everything observed so far, in order
    pub fn events(&self) -> Vec<ScrapeEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Highest number of scrapes that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, event: ScrapeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[async_trait]
impl ScrapeApi for MockScrapeApi {
    async fn map_website(&self, _url: &str, limit: usize) -> Result<Vec<String>, FirecrawlError> {
        if let Some(message) = &self.map_failure {
            return Err(FirecrawlError::Unsuccessful(message.clone()));
        }
        Ok(self.map_urls.iter().take(limit).cloned().collect())
    }

    async fn scrape_url(&self, url: &str) -> Result<ScrapedPage, FirecrawlError> {
        self.record(ScrapeEvent::Started(url.to_string()));
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.latency.get(url) {
            tokio::time::sleep(*delay).await;
        }

        let result = if self.failing.contains(url) {
            Err(FirecrawlError::Status {
                status: 500,
                message: format!("Mock scrape failure for {url}"),
            })
        } else if let Some(page) = self.pages.get(url) {
            Ok(page.clone())
        } else if self.serve_any {
            Ok(sample_page(url))
        } else {
            Err(FirecrawlError::Status {
                status: 404,
                message: format!("Mock has no page for {url}"),
            })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.record(ScrapeEvent::Finished(url.to_string()));
        result
    }
}

//
// Test Fixtures
//

/// A page whose title and description are derived from its URL
pub fn sample_page(url: &str) -> ScrapedPage {
    let mut metadata = Map::new();
    metadata.insert("title".to_string(), Value::String(format!("Title of {url}")));
    metadata.insert("description".to_string(), Value::String(format!("Description of {url}")));
    metadata.insert("statusCode".to_string(), Value::from(200));

    ScrapedPage {
        url: url.to_string(),
        markdown: format!("# Content\n\nMarkdown for {url}"),
        raw_html: None,
        metadata,
    }
}

/// A page whose raw HTML carries the given head markup
pub fn page_with_head(url: &str, head: &str) -> ScrapedPage {
    ScrapedPage {
        url: url.to_string(),
        markdown: format!("Content of {url}"),
        raw_html: Some(format!("<html><head>{head}</head><body><p>Body</p></body></html>")),
        metadata: Map::new(),
    }
}
