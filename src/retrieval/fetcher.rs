use std::time::Duration;

use crate::config::Config;
use crate::error::FetchError;
use crate::text::normalize;

use super::extract::extract_main_text;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Raw bytes read from a page before the rest of the body is discarded.
const MAX_BODY_BYTES: usize = 2_000_000;

/// HTTP client shared by the search, fetch and generation stages.
///
/// Carries no overall timeout; page fetches set their own per request.
pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    char_limit: usize,
    timeout: Duration,
    max_body_bytes: usize,
}

impl PageFetcher {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            char_limit: config.page_char_limit,
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    /// Normalized article text of `url`, or `None` if anything went wrong.
    pub async fn fetch(&self, url: &str) -> Option<String> {
        match self.try_fetch(url).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(url, error = %e, "error scraping page");
                None
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !content_type.to_ascii_lowercase().contains("html") {
                return Err(FetchError::NotHtml(content_type.to_string()));
            }
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let remaining = self.max_body_bytes - body.len();
            if chunk.len() >= remaining {
                body.extend_from_slice(&chunk[..remaining]);
                tracing::debug!(url, limit = self.max_body_bytes, "page body cut at limit");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        let body = String::from_utf8_lossy(&body);
        let text = extract_main_text(&body).ok_or(FetchError::NoContent)?;
        Ok(normalize(&text, self.char_limit))
    }
}
