//! Configuration options for llms.txt generation.

use std::time::Duration;

/// Default cap on the number of pages processed.
pub const DEFAULT_MAX_URLS: usize = 20;
/// Default number of pages scraped concurrently, and per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Default pause between two batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);
/// Default time allowed for one generated summary.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);
/// URLs requested from the map endpoint when patterns will filter them down.
pub const FILTERED_MAP_LIMIT: usize = 1_000;

/// Configuration options for the generator.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Regex patterns; a URL is kept if it matches any of them (empty: keep all)
    pub include_patterns: Vec<String>,
    /// Maximum number of pages to process
    pub max_urls: usize,
    /// Pages per batch, which is also the concurrency bound
    pub batch_size: usize,
    /// Pause between batches
    pub batch_delay: Duration,
    /// Time allowed for one generated summary before falling back
    pub generation_timeout: Duration,
    /// Whether llms-full.txt is produced (and page markdown kept)
    pub full_text: bool,
    /// Explicit limit for the map call
    pub map_limit: Option<usize>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            max_urls: DEFAULT_MAX_URLS,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            full_text: true,
            map_limit: None,
        }
    }
}

impl GeneratorOptions {
    /// Creates a new builder for GeneratorOptions.
    pub fn builder() -> GeneratorOptionsBuilder {
        GeneratorOptionsBuilder::default()
    }

    /// How many URLs to ask the map endpoint for. Filtering needs more candidates than the cap,
    /// and a resumed run needs room past the `already_processed` URLs it will skip.
    pub fn effective_map_limit(&self, already_processed: usize) -> usize {
        let wanted = self.max_urls.saturating_add(already_processed);
        match self.map_limit {
            Some(limit) => limit,
            None if self.include_patterns.is_empty() => wanted,
            None => FILTERED_MAP_LIMIT.max(wanted),
        }
    }
}

/// Builder for GeneratorOptions.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptionsBuilder {
    include_patterns: Vec<String>,
    max_urls: Option<usize>,
    batch_size: Option<usize>,
    batch_delay: Option<Duration>,
    generation_timeout: Option<Duration>,
    full_text: Option<bool>,
    map_limit: Option<usize>,
}

impl GeneratorOptionsBuilder {
    /// Adds a pattern to include.
    pub fn include_pattern(mut self, pattern: String) -> Self {
        self.include_patterns.push(pattern);
        self
    }

    /// Adds multiple patterns to include.
    pub fn include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns.extend(patterns);
        self
    }

    pub fn max_urls(mut self, max_urls: usize) -> Self {
        self.max_urls = Some(max_urls);
        self
    }

    /// Sets the batch size (number of simultaneous scrapes).
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = Some(delay);
        self
    }

    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    pub fn full_text(mut self, full_text: bool) -> Self {
        self.full_text = Some(full_text);
        self
    }

    pub fn map_limit(mut self, limit: usize) -> Self {
        self.map_limit = Some(limit);
        self
    }

    /// Builds the GeneratorOptions. A batch size of zero is raised to one.
    pub fn build(self) -> GeneratorOptions {
        GeneratorOptions {
            include_patterns: self.include_patterns,
            max_urls: self.max_urls.unwrap_or(DEFAULT_MAX_URLS),
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE).max(1),
            batch_delay: self.batch_delay.unwrap_or(DEFAULT_BATCH_DELAY),
            generation_timeout: self.generation_timeout.unwrap_or(DEFAULT_GENERATION_TIMEOUT),
            full_text: self.full_text.unwrap_or(true),
            map_limit: self.map_limit,
        }
    }
}
