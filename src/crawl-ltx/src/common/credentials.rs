//! API key lookup: command-line flag, then the `.env` file, then the process environment.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::Error;

pub const FIRECRAWL_API_KEY: &str = "FIRECRAWL_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Values read from a `.env` file. The process environment is never modified.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    env_file: HashMap<String, String>,
}

impl Credentials {
    /// Reads `path` if it exists. An unreadable or malformed file is reported and ignored.
    pub fn load(path: &Path) -> Self {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                debug!("No env file at {}", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Ignoring env file {}: {}", path.display(), e);
                return Self::default();
            }
        };

        let mut env_file = HashMap::new();
        for item in iter {
            match item {
                Ok((key, value)) => {
                    env_file.insert(key, value);
                }
                Err(e) => warn!("Skipping malformed line in {}: {}", path.display(), e),
            }
        }
        Self { env_file }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            env_file: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// The first non-empty value among `flag`, the env file and the process environment.
    pub fn resolve(&self, flag: Option<&str>, name: &str) -> Option<String> {
        self.resolve_with(flag, name, |key| std::env::var(key).ok())
    }

    /// Like [`resolve`](Self::resolve), reading the environment through `env`.
    pub fn resolve_with(&self, flag: Option<&str>, name: &str, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        flag.map(str::to_string)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.env_file.get(name).cloned().filter(|v| !v.trim().is_empty()))
            .or_else(|| env(name).filter(|v| !v.trim().is_empty()))
    }

    /// Like [`resolve`](Self::resolve), but a missing key is an error.
    pub fn require(&self, flag: Option<&str>, name: &'static str) -> Result<String, Error> {
        self.resolve(flag, name).ok_or(Error::MissingApiKey(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |_| Some(value.to_string())
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_flag_wins() {
        let credentials = Credentials::from_pairs([(FIRECRAWL_API_KEY, "from-file")]);
        let key = credentials.resolve_with(Some("from-flag"), FIRECRAWL_API_KEY, env_with("from-env"));
        assert_eq!(key.as_deref(), Some("from-flag"));
    }

    #[test]
    fn test_file_beats_environment() {
        let credentials = Credentials::from_pairs([(FIRECRAWL_API_KEY, "from-file")]);
        let key = credentials.resolve_with(None, FIRECRAWL_API_KEY, env_with("from-env"));
        assert_eq!(key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_environment_last() {
        let credentials = Credentials::default();
        let key = credentials.resolve_with(None, FIRECRAWL_API_KEY, env_with("from-env"));
        assert_eq!(key.as_deref(), Some("from-env"));
        assert_eq!(credentials.resolve_with(None, FIRECRAWL_API_KEY, no_env), None);
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let credentials = Credentials::from_pairs([(OPENAI_API_KEY, "  ")]);
        let key = credentials.resolve_with(Some(""), OPENAI_API_KEY, env_with("from-env"));
        assert_eq!(key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_load_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# keys\nFIRECRAWL_API_KEY=fc-123\nOPENAI_API_KEY=\"sk-456\"\n").unwrap();

        let credentials = Credentials::load(&path);
        assert_eq!(
            credentials.resolve_with(None, FIRECRAWL_API_KEY, no_env).as_deref(),
            Some("fc-123")
        );
        assert_eq!(credentials.resolve_with(None, OPENAI_API_KEY, no_env).as_deref(), Some("sk-456"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let credentials = Credentials::load(&dir.path().join("missing.env"));
        assert_eq!(credentials.resolve_with(None, FIRECRAWL_API_KEY, no_env), None);
    }
}
