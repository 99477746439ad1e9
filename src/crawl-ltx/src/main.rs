use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgAction, Parser};
use crawl_ltx::{
    Error, Firecrawl, Generator, GeneratorOptions, MetadataResolver, PatternSet, ResumeState, UrlSource,
    common::credentials::{Credentials, FIRECRAWL_API_KEY, OPENAI_API_KEY},
    common::logging::{log_settings, setup_logging},
    config::{DEFAULT_BATCH_SIZE, DEFAULT_MAX_URLS},
    discovery::{read_url_file, sitemap_client},
    firecrawl::DEFAULT_API_URL,
    llms::{ChatGpt, LlmProvider, chatgpt::DEFAULT_MODEL},
};

/// Upper bound on any single call to the scraping API or a sitemap server.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Parser)]
#[command(name = "generate-llmstxt")]
#[command(about = "Generate llms.txt and llms-full.txt for a website using Firecrawl", long_about = None)]
struct Cli {
    /// The website to generate llms.txt for.
    #[arg(value_parser = validate_url)]
    url: String,

    /// Only process URLs matching this regex pattern (anchored at the start of the URL). Repeat for more.
    #[arg(long = "include-patterns", visible_alias = "include-pattern", action = ArgAction::Append)]
    include_patterns: Vec<String>,

    /// Maximum number of pages to process.
    #[arg(long, default_value_t = DEFAULT_MAX_URLS)]
    max_urls: usize,

    /// Directory that llms.txt and llms-full.txt are written to.
    #[arg(long, default_value = ".", value_parser = validate_output_dir)]
    output_dir: PathBuf,

    /// Only write llms.txt.
    #[arg(long)]
    no_full_text: bool,

    /// Log per-URL progress and failure reasons.
    #[arg(short, long)]
    verbose: bool,

    /// Firecrawl API key (default: FIRECRAWL_API_KEY from the env file or environment).
    #[arg(long)]
    firecrawl_api_key: Option<String>,

    /// Firecrawl API base URL.
    #[arg(long, default_value = DEFAULT_API_URL, value_parser = validate_url)]
    firecrawl_api_url: String,

    /// OpenAI API key (default: OPENAI_API_KEY from the env file or environment).
    #[arg(long)]
    openai_api_key: Option<String>,

    /// OpenAI model used for titles and descriptions.
    #[arg(long, default_value = DEFAULT_MODEL)]
    openai_model: String,

    /// Never generate titles and descriptions; use page metadata only.
    #[arg(long)]
    no_summary: bool,

    /// Pages scraped concurrently per batch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Pause between batches, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    batch_delay_ms: u64,

    /// How many URLs to request from the map endpoint.
    #[arg(long)]
    map_limit: Option<usize>,

    /// Discover URLs from this XML sitemap instead of the map endpoint.
    #[arg(long, value_parser = validate_url)]
    sitemap: Option<String>,

    /// Process the URLs listed in this file (one per line, or a `.yaml` url/section list) instead of discovering them.
    #[arg(long = "url-file", visible_alias = "file-pattern", value_parser = validate_input_file)]
    url_file: Option<PathBuf>,

    /// Print the URLs that would be processed, then stop.
    #[arg(long)]
    dry_run: bool,

    /// Skip URLs already in the output directory's llms.txt and append new entries.
    #[arg(long)]
    resume: bool,

    /// Env file to read API keys from.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

fn validate_url(s: &str) -> Result<String, String> {
    url::Url::parse(s)
        .map(|_| s.to_string())
        .map_err(|e| format!("Invalid URL: {}", e))
}

fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    Ok(path)
}

fn validate_output_dir(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && !path.is_dir() {
        return Err(format!("Output path is not a directory: {}", path.display()));
    }

    Ok(path)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(log_settings(cli.verbose));

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        std::process::exit(1)
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let options = GeneratorOptions::builder()
        .include_patterns(cli.include_patterns.clone())
        .max_urls(cli.max_urls)
        .batch_size(cli.batch_size)
        .batch_delay(Duration::from_millis(cli.batch_delay_ms))
        .full_text(!cli.no_full_text);
    let options = match cli.map_limit {
        Some(limit) => options.map_limit(limit),
        None => options,
    }
    .build();

    // Bad patterns fail before credentials are even looked at.
    PatternSet::compile_all(&options.include_patterns)?;

    let credentials = Credentials::load(&cli.env_file);
    let firecrawl_api_key = credentials.require(cli.firecrawl_api_key.as_deref(), FIRECRAWL_API_KEY)?;
    let api = Firecrawl::new(&firecrawl_api_key, &cli.firecrawl_api_url, HTTP_TIMEOUT)?;

    let provider: Option<Arc<dyn LlmProvider>> = if cli.no_summary {
        None
    } else {
        match credentials.resolve(cli.openai_api_key.as_deref(), OPENAI_API_KEY) {
            Some(key) => Some(Arc::new(ChatGpt::new(&key, &cli.openai_model)) as Arc<dyn LlmProvider>),
            None => {
                tracing::warn!("{} is not set; titles and descriptions come from page metadata", OPENAI_API_KEY);
                None
            }
        }
    };
    let resolver = MetadataResolver::new(provider, options.generation_timeout);

    let source = match (&cli.url_file, &cli.sitemap) {
        (Some(path), _) => UrlSource::Provided(read_url_file(path)?),
        (None, Some(sitemap)) => UrlSource::Sitemap(sitemap.clone()),
        (None, None) => UrlSource::Map,
    };

    let resume = if cli.resume {
        Some(ResumeState::load(&cli.output_dir)?)
    } else {
        None
    };

    let generator = Generator::new(Arc::new(api), resolver, options).with_http_client(sitemap_client(HTTP_TIMEOUT)?);
    let plan = generator.plan(&cli.url, &source, resume.as_ref()).await?;

    if cli.dry_run {
        println!(
            "Dry run: {} of {} discovered URLs would be processed ({} after filtering, {} already processed)",
            plan.urls.len(),
            plan.discovered,
            plan.filtered,
            plan.skipped
        );
        for url in &plan.urls {
            println!("{}", url);
        }
        return Ok(());
    }

    let output = generator.execute(&plan).await?;

    if output.results.is_empty() {
        tracing::warn!(
            "All {} URLs failed to scrape; no files were written",
            output.summary.attempted
        );
    } else {
        for path in output.write_to(&cli.output_dir)? {
            tracing::info!("Saved {}", path.display());
        }
    }

    println!("{}", output.summary);
    Ok(())
}
