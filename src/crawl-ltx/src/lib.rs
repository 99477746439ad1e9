//! # crawl-ltx
//!
//! Generates `llms.txt` and `llms-full.txt` for a website using the Firecrawl scraping API.
//!
//! The site's URLs are discovered (Firecrawl's map endpoint, a sitemap, or a URL file),
//! filtered by regex include patterns, capped, then scraped in batches. Each page gets a
//! short title and description, generated by an LLM when one is configured and otherwise
//! taken from the page's own metadata.
//!
//! ```no_run
//! use std::sync::Arc;
//! use crawl_ltx::{Firecrawl, Generator, GeneratorOptions, MetadataResolver, UrlSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = Firecrawl::new("fc-...", crawl_ltx::firecrawl::DEFAULT_API_URL, std::time::Duration::from_secs(60))?;
//!     let options = GeneratorOptions::builder()
//!         .include_pattern(".*/docs/.*".to_string())
//!         .max_urls(50)
//!         .build();
//!
//!     let generator = Generator::new(Arc::new(api), MetadataResolver::without_generation(), options);
//!     let output = generator.generate("https://example.com", &UrlSource::Map, None).await?;
//!     output.write_to(std::path::Path::new("."))?;
//!     println!("{}", output.summary);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod common;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod filter;
pub mod firecrawl;
pub mod generator;
pub mod html;
pub mod llms;
pub mod orchestrator;
pub mod render;
pub mod resolve;
pub mod resume;
pub mod text_utils;

pub use config::{GeneratorOptions, GeneratorOptionsBuilder};
pub use discovery::{DiscoveryError, UrlSource};
pub use errors::{Error, NoUrlsReason};
pub use filter::{FilteredUrlSet, PatternError, PatternSet, UrlPattern, ValidationResult, validate};
pub use firecrawl::{Firecrawl, FirecrawlError, ScrapeApi, ScrapedPage};
pub use generator::{Generator, Output, Plan};
pub use orchestrator::{BatchOrchestrator, FetchFailure, PageResult, RunSummary};
pub use resolve::{MetadataResolver, Resolved, Strategy};
pub use resume::ResumeState;
