//! Regex URL filtering for `--include-patterns`.
//!
//! Patterns are anchored at the start of the URL: `^https://example\.com/docs/` and `.*/docs/.*` both
//! behave predictably, while a bare `docs` only matches URLs that begin with "docs". A set of patterns
//! is compiled all-or-nothing and matches with OR semantics. The empty set matches every URL.

use regex::Regex;
use thiserror::Error;

/// Why a user-supplied pattern was rejected.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern is empty or only whitespace.
    #[error("Pattern cannot be empty. Use a valid regex pattern.")]
    Empty,

    /// The pattern is not valid regex syntax.
    #[error("Invalid regex pattern: '{pattern}'. Error: {detail}.{}", suggestion_suffix(.detail))]
    Invalid {
        pattern: String,
        detail: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of validating a single pattern without keeping the compiled form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error_message: Option<String>,
}

/// A user-supplied regex that compiled successfully.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    compiled: Regex,
}

impl UrlPattern {
    /// Compiles the pattern, anchored at the start of the input.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.trim().is_empty() {
            return Err(PatternError::Empty);
        }

        let invalid = |source: regex::Error| PatternError::Invalid {
            pattern: pattern.to_string(),
            detail: syntax_detail(&source),
            source,
        };

        // syntax is checked as written: wrapping first could balance a stray `)`
        Regex::new(pattern).map_err(invalid)?;
        let compiled = Regex::new(&format!("^(?:{pattern})")).map_err(invalid)?;

        Ok(Self {
            source: pattern.to_string(),
            compiled,
        })
    }

    /// The pattern as the user wrote it.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.compiled.is_match(url)
    }
}

/// Compiled `--include-patterns`, held immutably for the whole run.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<UrlPattern>,
}

impl PatternSet {
    /// Compiles every pattern. A single invalid pattern rejects the whole set.
    pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| UrlPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True iff the URL matches at least one pattern, or the set is empty.
    pub fn matches(&self, url: &str) -> bool {
        self.is_empty() || self.patterns.iter().any(|p| p.is_match(url))
    }

    /// Keeps the URLs that match, in their original order.
    pub fn filter(&self, urls: Vec<String>) -> FilteredUrlSet {
        let filtered = urls.iter().filter(|url| self.matches(url)).cloned().collect();
        FilteredUrlSet { original: urls, filtered }
    }

    /// The patterns joined with `|`, as shown to users.
    pub fn display(&self) -> String {
        self.patterns.iter().map(UrlPattern::as_str).collect::<Vec<_>>().join("|")
    }
}

/// The discovered URLs and the subset that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredUrlSet {
    original: Vec<String>,
    filtered: Vec<String>,
}

impl FilteredUrlSet {
    pub fn original(&self) -> &[String] {
        &self.original
    }

    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    pub fn original_count(&self) -> usize {
        self.original.len()
    }

    pub fn filter_count(&self) -> usize {
        self.filtered.len()
    }

    /// Fraction of discovered URLs kept, in `[0.0, 1.0]`. Zero when nothing was discovered.
    pub fn filter_ratio(&self) -> f64 {
        if self.original.is_empty() {
            0.0
        } else {
            self.filtered.len() as f64 / self.original.len() as f64
        }
    }

    /// Destroys the set, keeping only the filtered URLs.
    pub fn into_filtered(self) -> Vec<String> {
        self.filtered
    }
}

/// Checks a single pattern, reporting a user-facing message when it is unusable.
pub fn validate(pattern: &str) -> ValidationResult {
    match UrlPattern::new(pattern) {
        Ok(_) => ValidationResult {
            is_valid: true,
            error_message: None,
        },
        Err(e) => ValidationResult {
            is_valid: false,
            error_message: Some(e.to_string()),
        },
    }
}

/// Message shown when the filter kept nothing. Not an error: it is a legitimate outcome.
pub fn no_matches_message(patterns: &PatternSet, total_urls: usize) -> String {
    format!(
        "No URLs matched the pattern '{}' out of {} discovered URLs. No llms.txt files will be generated.",
        patterns.display(),
        total_urls
    )
}

/// The last line of the regex crate's (multi-line) syntax error, which holds the actual complaint.
fn syntax_detail(error: &regex::Error) -> String {
    match error {
        regex::Error::Syntax(msg) => msg
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().trim_start_matches("error:").trim().to_string())
            .unwrap_or_else(|| msg.clone()),
        other => other.to_string(),
    }
}

const SUGGESTIONS: [(&str, &str); 7] = [
    ("unclosed group", "Check for unmatched opening or closing parentheses"),
    ("unopened group", "Check for unmatched opening or closing parentheses"),
    ("unclosed character class", "Check for unmatched square brackets"),
    ("invalid character class range", "Check character ranges in square brackets (e.g., [a-z])"),
    (
        "repetition operator missing expression",
        "Check for quantifiers (*, +, ?, {}) without preceding characters",
    ),
    ("invalid repetition count range", "Check that repetition ranges are ordered (e.g., {1,3})"),
    ("incomplete escape sequence", "Check for a trailing backslash"),
];

/// A hint for the most common syntax mistakes, if the error looks like one of them.
pub fn suggestion_for(detail: &str) -> Option<&'static str> {
    let detail = detail.to_lowercase();
    SUGGESTIONS
        .iter()
        .find(|(needle, _)| detail.contains(needle))
        .map(|(_, hint)| *hint)
}

fn suggestion_suffix(detail: &str) -> String {
    suggestion_for(detail)
        .map(|hint| format!(" Suggestion: {hint}"))
        .unwrap_or_default()
}
