//! Title and description resolution.
//!
//! A page's title and description are resolved independently by walking an ordered
//! list of strategies. The first strategy that yields a non-empty value for a field wins
//! that field; the walk stops once both fields are filled. The final strategy derives a
//! value from the URL alone, so resolution always succeeds.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::html::MetaTags;
use crate::llms::{LlmProvider, summarize_page};
use crate::text_utils::{clean_text, title_from_url};

/// Titles longer than this are cut and end in `...`.
pub const MAX_TITLE_CHARS: usize = 60;
/// Descriptions longer than this are cut and end in `...`.
pub const MAX_DESCRIPTION_CHARS: usize = 120;
/// Description used when no strategy produced one.
pub const NO_DESCRIPTION: &str = "No description available";

/// Where a title or description came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Generated by the LLM backend from the page's markdown.
    Generative,
    /// The document's `<title>`.
    TitleTag,
    /// `og:title` / `og:description`.
    OpenGraph,
    /// `twitter:title` / `twitter:description`.
    TwitterCard,
    /// `<meta name="description">`.
    MetaDescription,
    /// Derived from the URL path; the description is the fixed placeholder.
    UrlPath,
}

impl Strategy {
    /// Structured metadata first: the author's own `<title>` beats social tags,
    /// social descriptions beat the plain meta description.
    pub const DEFAULT_ORDER: [Strategy; 6] = [
        Strategy::Generative,
        Strategy::TitleTag,
        Strategy::OpenGraph,
        Strategy::TwitterCard,
        Strategy::MetaDescription,
        Strategy::UrlPath,
    ];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Generative => "generated",
            Strategy::TitleTag => "title tag",
            Strategy::OpenGraph => "open graph",
            Strategy::TwitterCard => "twitter card",
            Strategy::MetaDescription => "meta description",
            Strategy::UrlPath => "url",
        };
        write!(f, "{}", name)
    }
}

/// A page's resolved title and description, both cleaned and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub title: String,
    pub description: String,
    pub title_source: Strategy,
    pub description_source: Strategy,
}

#[derive(Debug, Default)]
struct Candidate {
    title: Option<String>,
    description: Option<String>,
}

impl Candidate {
    fn new(title: Option<&str>, description: Option<&str>) -> Self {
        Self {
            title: title.map(|t| clean_text(t, MAX_TITLE_CHARS)).filter(|t| !t.is_empty()),
            description: description
                .map(|d| clean_text(d, MAX_DESCRIPTION_CHARS))
                .filter(|d| !d.is_empty()),
        }
    }
}

/// Resolves titles and descriptions, optionally asking an LLM backend first.
#[derive(Clone)]
pub struct MetadataResolver {
    provider: Option<Arc<dyn LlmProvider>>,
    timeout: Duration,
    strategies: Vec<Strategy>,
}

impl MetadataResolver {
    /// `provider` is consulted first when present; it gets at most `timeout` per page.
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            strategies: Strategy::DEFAULT_ORDER.to_vec(),
        }
    }

    /// Structured metadata and URL fallback only.
    pub fn without_generation() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Replaces the strategy order. The URL fallback still applies when the list runs out.
    pub fn with_strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn has_generation(&self) -> bool {
        self.provider.is_some() && self.strategies.contains(&Strategy::Generative)
    }

    /// Never fails: a backend error or timeout only moves resolution on to the next strategy.
    pub async fn resolve(&self, url: &str, markdown: &str, meta: &MetaTags) -> Resolved {
        let mut title: Option<(String, Strategy)> = None;
        let mut description: Option<(String, Strategy)> = None;

        for strategy in &self.strategies {
            if title.is_some() && description.is_some() {
                break;
            }

            let candidate = self.attempt(*strategy, url, markdown, meta).await;
            if title.is_none() {
                title = candidate.title.map(|t| (t, *strategy));
            }
            if description.is_none() {
                description = candidate.description.map(|d| (d, *strategy));
            }
        }

        let (title, title_source) = title.unwrap_or_else(|| (url_title(url), Strategy::UrlPath));
        let (description, description_source) =
            description.unwrap_or_else(|| (NO_DESCRIPTION.to_string(), Strategy::UrlPath));

        debug!("Resolved {} (title from {}, description from {})", url, title_source, description_source);

        Resolved {
            title,
            description,
            title_source,
            description_source,
        }
    }

    async fn attempt(&self, strategy: Strategy, url: &str, markdown: &str, meta: &MetaTags) -> Candidate {
        match strategy {
            Strategy::Generative => self.generate(url, markdown).await,
            Strategy::TitleTag => Candidate::new(meta.title.as_deref(), None),
            Strategy::OpenGraph => Candidate::new(meta.og_title.as_deref(), meta.og_description.as_deref()),
            Strategy::TwitterCard => {
                Candidate::new(meta.twitter_title.as_deref(), meta.twitter_description.as_deref())
            }
            Strategy::MetaDescription => Candidate::new(None, meta.description.as_deref()),
            Strategy::UrlPath => Candidate::new(Some(url_title(url).as_str()), Some(NO_DESCRIPTION)),
        }
    }

    async fn generate(&self, url: &str, markdown: &str) -> Candidate {
        let Some(provider) = &self.provider else {
            return Candidate::default();
        };
        if markdown.trim().is_empty() {
            return Candidate::default();
        }

        match summarize_page(provider.as_ref(), url, markdown, self.timeout).await {
            Ok(summary) => Candidate::new(Some(summary.title.as_str()), Some(summary.description.as_str())),
            Err(e) => {
                debug!("Generation failed for {}, falling back to page metadata: {}", url, e);
                Candidate::default()
            }
        }
    }
}

fn url_title(url: &str) -> String {
    clean_text(&title_from_url(url), MAX_TITLE_CHARS)
}
