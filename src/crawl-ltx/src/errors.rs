use crate::discovery::DiscoveryError;
use crate::filter::{PatternError, PatternSet, no_matches_message};
use crate::firecrawl::FirecrawlError;

/// Why a run ended without any URL to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoUrlsReason {
    /// Discovery itself returned nothing.
    DiscoveryEmpty,
    /// URLs were discovered, but none matched the include patterns.
    NoPatternMatch(String),
    /// Every remaining URL was already listed in the existing llms.txt.
    AllProcessed { already_processed: usize },
    /// The orchestrator was handed an empty list.
    NothingToProcess,
}

impl NoUrlsReason {
    pub fn no_pattern_match(patterns: &PatternSet, discovered: usize) -> Self {
        NoUrlsReason::NoPatternMatch(no_matches_message(patterns, discovered))
    }
}

impl std::fmt::Display for NoUrlsReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoUrlsReason::DiscoveryEmpty => write!(f, "No URLs found for the website"),
            NoUrlsReason::NoPatternMatch(message) => write!(f, "{}", message),
            NoUrlsReason::AllProcessed { already_processed } => write!(
                f,
                "All {} URLs were already processed. Nothing left to resume.",
                already_processed
            ),
            NoUrlsReason::NothingToProcess => write!(f, "No URLs to process"),
        }
    }
}

/// Run-level failures of llms.txt generation. Per-page failures never surface here.
#[derive(Debug)]
pub enum Error {
    /// One of the include patterns is not a valid regex.
    Pattern(PatternError),

    /// The URLs of the site could not be discovered.
    Discovery(DiscoveryError),

    /// There is nothing to process.
    NoUrls(NoUrlsReason),

    /// A required API key was not given by flag, env file, or environment.
    MissingApiKey(&'static str),

    /// The site URL is not a valid URL.
    InvalidUrl(url::ParseError),

    /// The scraping client could not be set up.
    Client(FirecrawlError),

    /// Reading previous output or writing new output failed.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Pattern(err) => write!(f, "{}", err),
            Error::Discovery(err) => write!(f, "{}", err),
            Error::NoUrls(reason) => write!(f, "{}", reason),
            Error::MissingApiKey(name) => write!(
                f,
                "{} is not set. Pass it as a flag, put it in a .env file, or export it.",
                name
            ),
            Error::InvalidUrl(err) => write!(f, "Not a valid URL: {}", err),
            Error::Client(err) => write!(f, "Cannot create scraping client: {}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Pattern(err) => Some(err),
            Error::Discovery(err) => Some(err),
            Error::InvalidUrl(err) => Some(err),
            Error::Client(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::NoUrls(_) | Error::MissingApiKey(_) => None,
        }
    }
}

impl From<PatternError> for Error {
    fn from(err: PatternError) -> Self {
        Error::Pattern(err)
    }
}

impl From<DiscoveryError> for Error {
    fn from(err: DiscoveryError) -> Self {
        Error::Discovery(err)
    }
}

impl From<NoUrlsReason> for Error {
    fn from(reason: NoUrlsReason) -> Self {
        Error::NoUrls(reason)
    }
}

impl From<FirecrawlError> for Error {
    fn from(err: FirecrawlError) -> Self {
        Error::Client(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
