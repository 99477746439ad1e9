//! HTML metadata extraction: `<title>`, Open Graph, Twitter Card and meta description.

use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::firecrawl::ScrapedPage;

/// The head metadata that titles and descriptions are resolved from.
/// Every field is either `None` or a non-empty, trimmed string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTags {
    pub title: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub twitter_title: Option<String>,
    pub twitter_description: Option<String>,
    pub description: Option<String>,
}

impl MetaTags {
    /// Parses the tags out of an HTML document.
    ///
    /// # Examples
    ///
    /// ```
    /// # use crawl_ltx::html::MetaTags;
    /// let html = r#"<html><head><title>Example Title</title></head></html>"#;
    /// assert_eq!(MetaTags::from_html(html).title, Some("Example Title".to_string()));
    /// ```
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        Self {
            title: get_title(&document),
            og_title: first_meta_content(&document, &[r#"meta[property="og:title"]"#, r#"meta[name="og:title"]"#]),
            og_description: first_meta_content(
                &document,
                &[r#"meta[property="og:description"]"#, r#"meta[name="og:description"]"#],
            ),
            twitter_title: first_meta_content(
                &document,
                &[r#"meta[name="twitter:title"]"#, r#"meta[property="twitter:title"]"#],
            ),
            twitter_description: first_meta_content(
                &document,
                &[r#"meta[name="twitter:description"]"#, r#"meta[property="twitter:description"]"#],
            ),
            description: first_meta_content(&document, &[r#"meta[name="description"]"#]),
        }
    }

    /// Reads the tags from Firecrawl's metadata map, which uses both `ogTitle` and `og:title` style keys.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        Self {
            title: metadata_value(metadata, &["title"]),
            og_title: metadata_value(metadata, &["ogTitle", "og:title"]),
            og_description: metadata_value(metadata, &["ogDescription", "og:description"]),
            twitter_title: metadata_value(metadata, &["twitter:title", "twitterTitle"]),
            twitter_description: metadata_value(metadata, &["twitter:description", "twitterDescription"]),
            description: metadata_value(metadata, &["description"]),
        }
    }

    /// Tags from the page's raw HTML, with gaps filled from the metadata map.
    pub fn from_page(page: &ScrapedPage) -> Self {
        let from_metadata = Self::from_metadata(&page.metadata);
        match &page.raw_html {
            Some(html) => Self::from_html(html).or(from_metadata),
            None => from_metadata,
        }
    }

    /// Keeps every field that is set, taking the rest from `other`.
    pub fn or(self, other: MetaTags) -> Self {
        Self {
            title: self.title.or(other.title),
            og_title: self.og_title.or(other.og_title),
            og_description: self.og_description.or(other.og_description),
            twitter_title: self.twitter_title.or(other.twitter_title),
            twitter_description: self.twitter_description.or(other.twitter_description),
            description: self.description.or(other.description),
        }
    }
}

fn get_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
        .and_then(non_empty)
}

/// The `content` attribute of the first matching meta tag that has a non-empty one.
fn first_meta_content(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|sel| {
        let selector = Selector::parse(sel).ok()?;
        document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .find_map(|content| non_empty(content.to_string()))
    })
}

/// Metadata values are strings, or arrays of strings when a page repeats a tag.
fn metadata_value(metadata: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match metadata.get(*key)? {
        Value::String(s) => non_empty(s.clone()),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find_map(|s| non_empty(s.to_string())),
        _ => None,
    })
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
