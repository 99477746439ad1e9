//! Text manipulation utilities.

use percent_encoding::percent_decode_str;
use url::Url;

/// Placeholder title used when nothing better can be derived.
pub const DEFAULT_TITLE: &str = "Page";

/// Capitalizes the first character of a string and lowercases the rest.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::text_utils::capitalize_string;
/// assert_eq!(capitalize_string("hello"), "Hello");
/// assert_eq!(capitalize_string("WORLD"), "World");
/// assert_eq!(capitalize_string(""), "");
/// ```
pub fn capitalize_string(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
    }
}

/// Collapses every run of whitespace (newlines included) into a single space and trims the ends.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::text_utils::collapse_whitespace;
/// assert_eq!(collapse_whitespace("  Getting\n\n  Started\t"), "Getting Started");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapses whitespace, then shortens to at most `max` characters by cutting
/// at `max - 3` and appending `...`.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::text_utils::clean_text;
/// assert_eq!(clean_text("short", 10), "short");
/// assert_eq!(clean_text("abcdefghijkl", 10), "abcdefg...");
/// ```
pub fn clean_text(s: &str, max: usize) -> String {
    let collapsed = collapse_whitespace(s);
    if collapsed.chars().count() <= max {
        return collapsed;
    }

    let keep = max.saturating_sub(3);
    let mut truncated: String = collapsed.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

/// A readable title derived from the URL alone: the last path segment, percent-decoded,
/// with its extension dropped and `-`/`_` turned into spaces, or the host for the site root.
///
/// # Examples
///
/// ```
/// # use crawl_ltx::text_utils::title_from_url;
/// assert_eq!(title_from_url("https://ex.com/docs/getting-started.html"), "Getting started");
/// assert_eq!(title_from_url("https://ex.com/caf%C3%A9-menu"), "Café menu");
/// assert_eq!(title_from_url("https://ex.com/"), "ex.com");
/// assert_eq!(title_from_url("not a url"), "Page");
/// ```
pub fn title_from_url(url: &str) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return DEFAULT_TITLE.to_string(),
    };

    let last_segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned());

    let title = match last_segment {
        Some(segment) => {
            let stem = match segment.rsplit_once('.') {
                Some((stem, _)) if !stem.is_empty() => stem,
                _ => segment.as_str(),
            };
            capitalize_string(&collapse_whitespace(&stem.replace(['-', '_'], " ")))
        }
        None => parsed.host_str().unwrap_or_default().to_string(),
    };

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_string() {
        assert_eq!(capitalize_string("hello"), "Hello");
        assert_eq!(capitalize_string("HELLO"), "Hello");
        assert_eq!(capitalize_string("h"), "H");
        assert_eq!(capitalize_string(""), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\nc"), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_clean_text_title_limit() {
        let long = "x".repeat(61);
        let cleaned = clean_text(&long, 60);
        assert_eq!(cleaned.chars().count(), 60);
        assert!(cleaned.ends_with("..."));
        assert_eq!(&cleaned[..57], &long[..57]);

        let exact = "y".repeat(60);
        assert_eq!(clean_text(&exact, 60), exact);
    }

    #[test]
    fn test_clean_text_description_limit() {
        let long = "word ".repeat(40);
        let cleaned = clean_text(&long, 120);
        assert_eq!(cleaned.chars().count(), 120);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn test_clean_text_counts_characters_not_bytes() {
        let long = "é".repeat(70);
        let cleaned = clean_text(&long, 60);
        assert_eq!(cleaned.chars().count(), 60);
    }

    #[test]
    fn test_title_from_url() {
        assert_eq!(title_from_url("https://ex.com/docs/api_reference"), "Api reference");
        assert_eq!(title_from_url("https://ex.com/docs/"), "Docs");
        assert_eq!(title_from_url("https://ex.com/archive.tar.gz"), "Archive.tar");
        assert_eq!(title_from_url("https://ex.com"), "ex.com");
        assert_eq!(title_from_url("https://ex.com/.hidden"), ".hidden");
        assert_eq!(title_from_url(""), "Page");
    }

    #[test]
    fn test_title_from_url_decodes_segments() {
        assert_eq!(title_from_url("https://ex.com/caf%C3%A9"), "Café");
        assert_eq!(title_from_url("https://ex.com/docs/getting%20started.html"), "Getting started");
        assert_eq!(title_from_url("https://ex.com/100%"), "100%");
    }
}
