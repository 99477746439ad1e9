//! Rendering of `llms.txt` and `llms-full.txt`.

use std::sync::LazyLock;

use regex::Regex;

use crate::orchestrator::PageResult;

pub const INDEX_FILE_NAME: &str = "llms.txt";
pub const FULL_FILE_NAME: &str = "llms-full.txt";

static PAGE_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|firecrawl-page-\d+-lllmstxt\|>\n?").expect("hardcoded regex pattern is valid"));

/// Separator that opens the `n`th (1-based) page of `llms-full.txt`.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::render::page_marker;
/// assert_eq!(page_marker(1), "<|firecrawl-page-1-lllmstxt|>");
/// ```
pub fn page_marker(n: usize) -> String {
    format!("<|firecrawl-page-{}-lllmstxt|>", n)
}

/// `# <site> llms.txt`, a blank line, then one `- [title](url): description` line per page.
pub fn render_index(site_url: &str, results: &[PageResult]) -> String {
    format!("# {} llms.txt\n\n{}", site_url, render_index_entries(results))
}

pub fn render_index_entries(results: &[PageResult]) -> String {
    results
        .iter()
        .map(|page| format!("- [{}]({}): {}\n", page.title, page.url, page.description))
        .collect()
}

/// `# <site> llms-full.txt`, a blank line, then every page's markdown under its marker and title.
pub fn render_full(site_url: &str, results: &[PageResult]) -> String {
    format!("# {} llms-full.txt\n\n{}", site_url, render_full_entries(results, 1))
}

/// Page sections numbered from `start`, for appending to an existing file.
pub fn render_full_entries(results: &[PageResult], start: usize) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, page)| format!("{}\n## {}\n{}\n\n", page_marker(start + i), page.title, page.markdown))
        .collect()
}

/// Removes every page marker (and the newline that follows it).
pub fn strip_page_markers(text: &str) -> String {
    PAGE_MARKER_REGEX.replace_all(text, "").into_owned()
}

/// How many pages an existing `llms-full.txt` holds.
pub fn count_page_markers(text: &str) -> usize {
    PAGE_MARKER_REGEX.find_iter(text).count()
}
