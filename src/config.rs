use anyhow::{Context, Result};
use std::str::FromStr;

/// Largest `num` the Custom Search API accepts per request.
pub const MAX_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub search_api_key: String,
    pub search_engine_id: String,
    pub generation_api_key: String,
    pub search_endpoint: String,
    pub generation_endpoint: String,
    pub generation_model: String,
    pub page_size: usize,
    pub fetch_workers: usize,
    pub fetch_timeout_secs: u64,
    pub page_char_limit: usize,
    pub context_char_limit: usize,
    pub preview_char_limit: usize,
    pub min_results: usize,
    pub max_results: usize,
    pub default_results: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            search_api_key: std::env::var("CSE_API_KEY").context("CSE_API_KEY must be set")?,
            search_engine_id: std::env::var("CSE_ID").context("CSE_ID must be set")?,
            generation_api_key: std::env::var("GOOGLE_API_KEY")
                .context("GOOGLE_API_KEY must be set")?,
            search_endpoint: std::env::var("SEARCH_ENDPOINT")
                .unwrap_or_else(|_| "https://www.googleapis.com/customsearch/v1".into()),
            generation_endpoint: std::env::var("GENERATION_ENDPOINT")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            generation_model: std::env::var("GENERATION_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".into()),
            page_size: env_number("SEARCH_PAGE_SIZE", 10)?,
            fetch_workers: env_number("FETCH_WORKERS", 10)?,
            fetch_timeout_secs: env_number("FETCH_TIMEOUT_SECS", 15)?,
            page_char_limit: env_number("PAGE_CHAR_LIMIT", 5_000)?,
            context_char_limit: env_number("CONTEXT_CHAR_LIMIT", 30_000)?,
            preview_char_limit: env_number("PREVIEW_CHAR_LIMIT", 10_000)?,
            min_results: env_number("MIN_RESULTS", 10)?,
            max_results: env_number("MAX_RESULTS", 100)?,
            default_results: env_number("DEFAULT_RESULTS", 50)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            anyhow::bail!(
                "SEARCH_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            );
        }
        if self.fetch_workers == 0 {
            anyhow::bail!("FETCH_WORKERS must be at least 1");
        }
        if self.min_results == 0 || self.min_results > self.max_results {
            anyhow::bail!(
                "MIN_RESULTS ({}) must be between 1 and MAX_RESULTS ({})",
                self.min_results,
                self.max_results
            );
        }
        Ok(())
    }

    /// Clamp a requested result count into the configured range.
    pub fn result_count(&self, requested: Option<usize>) -> ResultCount {
        ResultCount::clamped(
            requested.unwrap_or(self.default_results),
            self.min_results,
            self.max_results,
        )
    }

    #[cfg(test)]
    pub fn for_tests(search_endpoint: &str, generation_endpoint: &str) -> Self {
        Self {
            search_api_key: "search-key".into(),
            search_engine_id: "engine-id".into(),
            generation_api_key: "generation-key".into(),
            search_endpoint: search_endpoint.into(),
            generation_endpoint: generation_endpoint.into(),
            generation_model: "gemini-test".into(),
            page_size: 10,
            fetch_workers: 10,
            fetch_timeout_secs: 5,
            page_char_limit: 5_000,
            context_char_limit: 30_000,
            preview_char_limit: 10_000,
            min_results: 1,
            max_results: 100,
            default_results: 50,
        }
    }
}

fn env_number<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .ok()
            .with_context(|| format!("{key} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Number of search results to analyze, always inside the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCount(usize);

impl ResultCount {
    pub fn clamped(requested: usize, min: usize, max: usize) -> Self {
        let value = requested.clamp(min, max);
        if value != requested {
            tracing::warn!(requested, value, min, max, "result count out of range, clamped");
        }
        Self(value)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_count_is_clamped_to_range() {
        assert_eq!(ResultCount::clamped(5, 10, 100).get(), 10);
        assert_eq!(ResultCount::clamped(250, 10, 100).get(), 100);
        assert_eq!(ResultCount::clamped(42, 10, 100).get(), 42);
    }

    #[test]
    fn result_count_falls_back_to_default() {
        let mut config = Config::for_tests("http://search", "http://gen");
        config.default_results = 30;
        assert_eq!(config.result_count(None).get(), 30);
        assert_eq!(config.result_count(Some(0)).get(), 1);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut config = Config::for_tests("http://search", "http://gen");
        config.min_results = 50;
        config.max_results = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_page_size() {
        let mut config = Config::for_tests("http://search", "http://gen");
        config.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_ok());

        config.page_size = MAX_PAGE_SIZE + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SEARCH_PAGE_SIZE"), "{err}");

        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
