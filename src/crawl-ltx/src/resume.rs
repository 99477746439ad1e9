//! Continuing an interrupted run from the files it already wrote.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::render::{FULL_FILE_NAME, INDEX_FILE_NAME, count_page_markers};

/// An entry's link target runs up to the `)` that ends the link, which is followed by the
/// `: description` separator or the end of the line. URLs may contain parentheses.
static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)\[.*?\]\((https?://\S+?)\)(?::\s|[ \t]*$)").expect("hardcoded regex pattern is valid")
});

/// The URLs linked from an existing `llms.txt`.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::resume::processed_urls;
/// let urls = processed_urls("# https://ex.com llms.txt\n\n- [A](https://ex.com/a): About A\n");
/// assert!(urls.contains("https://ex.com/a"));
/// ```
pub fn processed_urls(llms_txt: &str) -> HashSet<String> {
    LINK_REGEX
        .captures_iter(llms_txt)
        .filter_map(|captures| captures.get(1))
        .map(|url| url.as_str().to_string())
        .collect()
}

/// What a previous run left behind in the output directory.
#[derive(Debug, Clone, Default)]
pub struct ResumeState {
    processed: HashSet<String>,
    existing_pages: usize,
}

impl ResumeState {
    /// Reads `llms.txt` and `llms-full.txt` from `output_dir`. Missing files mean a fresh start.
    pub fn load(output_dir: &Path) -> std::io::Result<Self> {
        let index = read_if_exists(&output_dir.join(INDEX_FILE_NAME))?;
        let full = read_if_exists(&output_dir.join(FULL_FILE_NAME))?;

        let state = Self {
            processed: index.as_deref().map(processed_urls).unwrap_or_default(),
            existing_pages: full.as_deref().map(count_page_markers).unwrap_or_default(),
        };
        info!(
            "Found {} already processed URLs and {} pages in {}",
            state.processed.len(),
            state.existing_pages,
            output_dir.display()
        );
        Ok(state)
    }

    pub fn is_processed(&self, url: &str) -> bool {
        self.processed.contains(url)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of the first page appended to `llms-full.txt`.
    pub fn next_page(&self) -> usize {
        self.existing_pages + 1
    }

    /// The URLs not yet processed, in their original order.
    pub fn skip_processed(&self, urls: Vec<String>) -> Vec<String> {
        urls.into_iter().filter(|url| !self.is_processed(url)).collect()
    }
}

fn read_if_exists(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
