//! Fetches and resolves pages in sequential, internally concurrent batches.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::batch::process_ordered;
use crate::config::GeneratorOptions;
use crate::errors::{Error, NoUrlsReason};
use crate::firecrawl::{FirecrawlError, ScrapeApi};
use crate::html::MetaTags;
use crate::resolve::{MetadataResolver, Strategy};

/// One successfully fetched page, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Empty when only llms.txt is produced.
    pub markdown: String,
    /// HTTP status the scraper saw, when it reported one.
    pub status_code: Option<u16>,
    pub title_source: Strategy,
    pub description_source: Strategy,
}

/// A URL that could not be fetched, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub url: String,
    pub reason: String,
}

/// Counts for one run. `discovered` and `filtered` are filled in by the caller that did discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub filtered: usize,
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FetchFailure>,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Discovered {} URLs, {} after filtering, {} succeeded, {} failed",
            self.discovered, self.filtered, self.succeeded, self.failed
        )
    }
}

/// Drives the page fetcher and metadata resolver over a list of URLs.
///
/// URLs are split into batches of `batch_size`. Each batch is scraped concurrently and
/// must finish before the next one starts; batches are separated by `batch_delay`.
pub struct BatchOrchestrator {
    api: Arc<dyn ScrapeApi>,
    resolver: MetadataResolver,
    batch_size: usize,
    batch_delay: Duration,
    keep_markdown: bool,
}

impl BatchOrchestrator {
    pub fn new(api: Arc<dyn ScrapeApi>, resolver: MetadataResolver, options: &GeneratorOptions) -> Self {
        Self {
            api,
            resolver,
            batch_size: options.batch_size.max(1),
            batch_delay: options.batch_delay,
            keep_markdown: options.full_text,
        }
    }

    /// Fetches every URL once. Results keep the order of `urls`; failed URLs are
    /// recorded in the summary and left out. Fails only when `urls` is empty.
    pub async fn run(&self, urls: &[String]) -> Result<(Vec<PageResult>, RunSummary), Error> {
        if urls.is_empty() {
            return Err(NoUrlsReason::NothingToProcess.into());
        }

        let batches: Vec<&[String]> = urls.chunks(self.batch_size).collect();
        let total_batches = batches.len();
        let mut slots: Vec<Option<PageResult>> = (0..urls.len()).map(|_| None).collect();
        let mut summary = RunSummary::default();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            info!(
                "Processing batch {}/{} ({} URLs)",
                batch_index + 1,
                total_batches,
                batch.len()
            );

            let offset = batch_index * self.batch_size;
            let outcomes = process_ordered(
                batch.to_vec(),
                |url, _| async move {
                    let outcome = self.process_url(&url).await;
                    (url, outcome)
                },
                self.batch_size,
            )
            .await;

            for (i, (url, outcome)) in outcomes.into_iter().enumerate() {
                summary.attempted += 1;
                match outcome {
                    Ok(page) => {
                        summary.succeeded += 1;
                        slots[offset + i] = Some(page);
                    }
                    Err(e) => {
                        debug!("Failed to scrape {}: {}", url, e);
                        summary.failed += 1;
                        summary.failures.push(FetchFailure {
                            url,
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if batch_index + 1 < total_batches && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        let results = slots.into_iter().flatten().collect();
        Ok((results, summary))
    }

    async fn process_url(&self, url: &str) -> Result<PageResult, FirecrawlError> {
        let page = self.api.scrape_url(url).await?;
        if page.markdown.trim().is_empty() {
            return Err(FirecrawlError::EmptyContent);
        }

        let meta = MetaTags::from_page(&page);
        let resolved = self.resolver.resolve(url, &page.markdown, &meta).await;
        let status_code = page.status_code();

        Ok(PageResult {
            url: url.to_string(),
            title: resolved.title,
            description: resolved.description,
            markdown: if self.keep_markdown { page.markdown } else { String::new() },
            status_code,
            title_source: resolved.title_source,
            description_source: resolved.description_source,
        })
    }
}
