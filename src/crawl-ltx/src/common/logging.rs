use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter for normal runs.
pub const DEFAULT_LOG_SETTINGS: &str = "crawl_ltx=info,generate_llmstxt=info";
/// Log filter for `--verbose` runs: adds per-URL detail and failure reasons.
pub const VERBOSE_LOG_SETTINGS: &str = "crawl_ltx=debug,generate_llmstxt=debug";

/// Sets the logging (tracing) level using RUST_LOG, falling back to the supplied default log settings.
pub fn setup_logging(default_log_settings: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_settings.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init()
}

/// The default log settings for the given verbosity.
pub fn log_settings(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LOG_SETTINGS
    } else {
        DEFAULT_LOG_SETTINGS
    }
}
