//! The generation pipeline: discover → filter → skip processed → cap → fetch → render.
//!
//! Split in two so a dry run can stop after [`Generator::plan`].

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GeneratorOptions;
use crate::discovery::{SITEMAP_TIMEOUT, UrlSource, discover, sitemap_client};
use crate::errors::{Error, NoUrlsReason};
use crate::filter::PatternSet;
use crate::firecrawl::ScrapeApi;
use crate::orchestrator::{BatchOrchestrator, PageResult, RunSummary};
use crate::render::{
    FULL_FILE_NAME, INDEX_FILE_NAME, render_full, render_full_entries, render_index, render_index_entries,
};
use crate::resolve::MetadataResolver;
use crate::resume::ResumeState;

/// The URLs a run will process, decided before anything is scraped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub site_url: String,
    pub urls: Vec<String>,
    pub discovered: usize,
    pub filtered: usize,
    /// Already present in the output being resumed.
    pub skipped: usize,
    /// First page number when appending to existing output.
    pub resume_from: Option<usize>,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct Output {
    pub site_url: String,
    pub results: Vec<PageResult>,
    pub summary: RunSummary,
    pub full_text: bool,
    pub resume_from: Option<usize>,
}

impl Output {
    /// Writes `llms.txt` (and `llms-full.txt` unless disabled) into `dir`, creating it if needed.
    /// When resuming, entries are appended to files that already exist.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let index_path = dir.join(INDEX_FILE_NAME);
        self.write_or_append(
            &index_path,
            || render_index(&self.site_url, &self.results),
            || render_index_entries(&self.results),
        )?;
        written.push(index_path);

        if self.full_text {
            let full_path = dir.join(FULL_FILE_NAME);
            let start = self.resume_from.unwrap_or(1);
            self.write_or_append(
                &full_path,
                || render_full(&self.site_url, &self.results),
                || render_full_entries(&self.results, start),
            )?;
            written.push(full_path);
        }

        Ok(written)
    }

    fn write_or_append(
        &self,
        path: &Path,
        document: impl FnOnce() -> String,
        entries: impl FnOnce() -> String,
    ) -> std::io::Result<()> {
        if self.resume_from.is_some() && path.exists() {
            let mut file = OpenOptions::new().append(true).open(path)?;
            file.write_all(entries().as_bytes())?;
            info!("Appended {} entries to {}", self.results.len(), path.display());
        } else {
            std::fs::write(path, document())?;
            info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

/// Runs the pipeline against a scraping backend.
pub struct Generator {
    api: Arc<dyn ScrapeApi>,
    http: reqwest::Client,
    resolver: MetadataResolver,
    options: GeneratorOptions,
}

impl Generator {
    pub fn new(api: Arc<dyn ScrapeApi>, resolver: MetadataResolver, options: GeneratorOptions) -> Self {
        Self {
            api,
            http: sitemap_client(SITEMAP_TIMEOUT).unwrap_or_default(),
            resolver,
            options,
        }
    }

    /// Client used to download sitemaps. The default gives up after [`SITEMAP_TIMEOUT`].
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Decides which URLs to process. Patterns are compiled before any network call,
    /// so an invalid pattern fails the run without discovery.
    pub async fn plan(&self, site_url: &str, source: &UrlSource, resume: Option<&ResumeState>) -> Result<Plan, Error> {
        let patterns = PatternSet::compile_all(&self.options.include_patterns)?;
        url::Url::parse(site_url)?;

        let discovered = discover(
            self.api.as_ref(),
            &self.http,
            site_url,
            source,
            self.options
                .effective_map_limit(resume.map_or(0, ResumeState::processed_count)),
        )
        .await?;
        if discovered.is_empty() {
            return Err(NoUrlsReason::DiscoveryEmpty.into());
        }
        let discovered_count = discovered.len();

        let candidates = if source.bypasses_filter() {
            if !patterns.is_empty() {
                warn!("--include-pattern is ignored when using --url-file. URLs from file are used directly.");
            }
            discovered
        } else {
            let filtered = patterns.filter(discovered);
            if filtered.filter_count() == 0 {
                return Err(NoUrlsReason::no_pattern_match(&patterns, filtered.original_count()).into());
            }
            if !patterns.is_empty() {
                info!(
                    "{} of {} URLs match '{}' ({:.1}%)",
                    filtered.filter_count(),
                    filtered.original_count(),
                    patterns.display(),
                    filtered.filter_ratio() * 100.0
                );
            }
            filtered.into_filtered()
        };
        let filtered_count = candidates.len();

        let (mut urls, skipped, resume_from) = match resume {
            Some(state) => {
                let remaining = state.skip_processed(candidates);
                if remaining.is_empty() {
                    return Err(NoUrlsReason::AllProcessed {
                        already_processed: state.processed_count(),
                    }
                    .into());
                }
                let skipped = filtered_count - remaining.len();
                info!("Skipping {} already processed URLs", skipped);
                (remaining, skipped, Some(state.next_page()))
            }
            None => (candidates, 0, None),
        };

        urls.truncate(self.options.max_urls);
        if urls.is_empty() {
            return Err(NoUrlsReason::NothingToProcess.into());
        }

        Ok(Plan {
            site_url: site_url.to_string(),
            urls,
            discovered: discovered_count,
            filtered: filtered_count,
            skipped,
            resume_from,
        })
    }

    /// Fetches and resolves every planned URL.
    pub async fn execute(&self, plan: &Plan) -> Result<Output, Error> {
        info!("Processing {} URLs", plan.urls.len());
        let orchestrator = BatchOrchestrator::new(self.api.clone(), self.resolver.clone(), &self.options);
        let (results, mut summary) = orchestrator.run(&plan.urls).await?;
        summary.discovered = plan.discovered;
        summary.filtered = plan.filtered;

        Ok(Output {
            site_url: plan.site_url.clone(),
            results,
            summary,
            full_text: self.options.full_text,
            resume_from: plan.resume_from,
        })
    }

    /// [`plan`](Self::plan) followed by [`execute`](Self::execute).
    pub async fn generate(
        &self,
        site_url: &str,
        source: &UrlSource,
        resume: Option<&ResumeState>,
    ) -> Result<Output, Error> {
        let plan = self.plan(site_url, source, resume).await?;
        self.execute(&plan).await
    }
}
