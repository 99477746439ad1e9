//! URL discovery: the Firecrawl map endpoint, an XML sitemap, or a local URL list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::firecrawl::{FirecrawlError, ScrapeApi};

/// Upper bound on a sitemap download when no client is supplied.
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the candidate URLs of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    /// Ask the scraping API to map the site.
    Map,
    /// Read `<loc>` entries from the sitemap at this URL.
    Sitemap(String),
    /// Use exactly these URLs (read from a file). They are not pattern-filtered.
    Provided(Vec<String>),
}

impl UrlSource {
    /// Provided URLs are used as given; include patterns do not apply to them.
    pub fn bypasses_filter(&self) -> bool {
        matches!(self, UrlSource::Provided(_))
    }
}

impl std::fmt::Display for UrlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlSource::Map => write!(f, "site map"),
            UrlSource::Sitemap(url) => write!(f, "sitemap {}", url),
            UrlSource::Provided(urls) => write!(f, "URL file ({} URLs)", urls.len()),
        }
    }
}

/// Discovery failed; the run cannot continue.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to map website: {0}")]
    Map(#[source] FirecrawlError),

    #[error("Failed to fetch sitemap {url}: {source}")]
    SitemapFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Sitemap parsing failed: {0}")]
    Sitemap(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to read URL file {}: {source}", path.display())]
    UrlFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML URL file {}: {source}", path.display())]
    UrlYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Discovers candidate URLs for `site_url`, dropping duplicates but keeping first-seen order.
pub async fn discover(
    api: &dyn ScrapeApi,
    http: &reqwest::Client,
    site_url: &str,
    source: &UrlSource,
    map_limit: usize,
) -> Result<Vec<String>, DiscoveryError> {
    let urls = match source {
        UrlSource::Map => {
            info!("Mapping website {} (limit {})", site_url, map_limit);
            api.map_website(site_url, map_limit).await.map_err(DiscoveryError::Map)?
        }
        UrlSource::Sitemap(sitemap_url) => {
            info!("Reading sitemap {}", sitemap_url);
            fetch_sitemap(http, sitemap_url).await?.urls
        }
        UrlSource::Provided(urls) => urls.clone(),
    };

    let urls = dedup(urls);
    info!("Discovered {} URLs from the {}", urls.len(), source);
    Ok(urls)
}

fn dedup(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}

/// The `<loc>` of every sitemap entry, in document order.
#[derive(Debug, Clone)]
pub struct Sitemap {
    pub urls: Vec<String>,
}

/// An HTTP client for sitemap downloads whose requests give up after `timeout`.
pub fn sitemap_client(timeout: Duration) -> Result<reqwest::Client, DiscoveryError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(DiscoveryError::Client)
}

/// Fetches and parses a sitemap from a URL.
///
/// # Errors
///
/// Returns an error if the HTTP request fails, the server answers with an error
/// status, or the XML is malformed.
pub async fn fetch_sitemap(http: &reqwest::Client, sitemap_url: &str) -> Result<Sitemap, DiscoveryError> {
    let fetch_error = |source: reqwest::Error| DiscoveryError::SitemapFetch {
        url: sitemap_url.to_string(),
        source,
    };

    let xml = http
        .get(sitemap_url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(fetch_error)?
        .text()
        .await
        .map_err(fetch_error)?;

    parse_sitemap(&xml)
}

/// Parses XML sitemap content in the standard format:
/// ```xml
/// <urlset>
///   <url>
///     <loc>https://example.com/page</loc>
///   </url>
/// </urlset>
/// ```
/// A sitemap without entries parses to an empty list.
pub fn parse_sitemap(xml: &str) -> Result<Sitemap, DiscoveryError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut current_url: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"url" => current_url = None,
                b"loc" => {
                    if let Ok(Event::Text(text)) = reader.read_event_into(&mut buf) {
                        current_url = Some(text.unescape().map_err(invalid_xml)?.trim().to_string());
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"url" {
                    if let Some(loc) = current_url.take().filter(|loc| !loc.is_empty()) {
                        urls.push(loc);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DiscoveryError::Sitemap(format!("XML parsing error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    debug!("Parsed {} sitemap entries", urls.len());
    Ok(Sitemap { urls })
}

fn invalid_xml(e: impl std::fmt::Display) -> DiscoveryError {
    DiscoveryError::Sitemap(format!("Invalid XML: {}", e))
}

/// Reads a URL list file. `.yaml`/`.yml` files go through [`parse_url_yaml`],
/// anything else through [`parse_url_list`].
pub fn read_url_file(path: &Path) -> Result<Vec<String>, DiscoveryError> {
    let contents = std::fs::read_to_string(path).map_err(|source| DiscoveryError::UrlFile {
        path: path.to_path_buf(),
        source,
    })?;

    if is_yaml(path) {
        parse_url_yaml(&contents).map_err(|source| DiscoveryError::UrlYaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        Ok(parse_url_list(&contents))
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// One URL per line. Blank lines and `#` comments are skipped, only the first
/// comma-separated field of a line is used, and fields that are not http(s) URLs
/// (such as a CSV header) are ignored.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::discovery::parse_url_list;
/// let urls = parse_url_list("url,title\n# docs\nhttps://ex.com/a,A\n\nhttps://ex.com/b\n");
/// assert_eq!(urls, vec!["https://ex.com/a", "https://ex.com/b"]);
/// ```
pub fn parse_url_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split(',').next())
        .map(|field| field.trim().trim_matches('"'))
        .filter(|field| is_http(field))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlDocument {
    Flat { urls: Vec<Option<String>> },
    Sectioned { sections: Vec<UrlSection> },
}

/// Section headers and descriptions may be present; only the URLs are used.
#[derive(Debug, Deserialize)]
struct UrlSection {
    #[serde(default)]
    urls: Vec<Option<String>>,
}

/// A YAML URL list, either flat or grouped into sections:
///
/// ```yaml
/// urls:
///   - https://ex.com/a
/// ```
///
/// ```yaml
/// sections:
///   - header: Guides
///     description: How-to guides
///     urls:
///       - https://ex.com/guides/a
/// ```
///
/// Section URLs are returned in document order. Empty entries, `#`-prefixed
/// entries, and entries that are not http(s) URLs are skipped.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::discovery::parse_url_yaml;
/// let urls = parse_url_yaml("urls:\n  - https://ex.com/a\n  -\n  - https://ex.com/b\n").unwrap();
/// assert_eq!(urls, vec!["https://ex.com/a", "https://ex.com/b"]);
/// ```
pub fn parse_url_yaml(contents: &str) -> Result<Vec<String>, serde_yaml::Error> {
    let entries = match serde_yaml::from_str::<UrlDocument>(contents)? {
        UrlDocument::Flat { urls } => urls,
        UrlDocument::Sectioned { sections } => sections.into_iter().flat_map(|section| section.urls).collect(),
    };

    Ok(entries
        .into_iter()
        .flatten()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.starts_with('#') && is_http(url))
        .collect())
}

fn is_http(field: &str) -> bool {
    field.starts_with("http://") || field.starts_with("https://")
}
