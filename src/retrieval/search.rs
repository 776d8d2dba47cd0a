use serde::Deserialize;

use crate::config::Config;
use crate::error::SearchError;

/// Google Custom Search JSON API client.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

impl SearchClient {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            endpoint: config.search_endpoint.clone(),
            api_key: config.search_api_key.clone(),
            engine_id: config.search_engine_id.clone(),
            page_size: config.page_size,
        }
    }

    /// Result links for `query` in ranking order, at most `desired_count` of them.
    pub async fn search(
        &self,
        query: &str,
        desired_count: usize,
    ) -> Result<Vec<String>, SearchError> {
        let pages = desired_count.div_ceil(self.page_size);
        let mut links: Vec<String> = Vec::with_capacity(desired_count);

        for page in 0..pages {
            let start = 1 + page * self.page_size;
            let items = self.fetch_page(query, start).await?;
            tracing::debug!(page, start, items = items.len(), "search page received");

            if items.is_empty() {
                break;
            }
            links.extend(items.into_iter().map(|item| item.link));
            if links.len() >= desired_count {
                break;
            }
        }

        links.truncate(desired_count);
        Ok(links)
    }

    async fn fetch_page(&self, query: &str, start: usize) -> Result<Vec<SearchItem>, SearchError> {
        let start = start.to_string();
        let num = self.page_size.to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("start", start.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Api { status, body });
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.items)
    }
}
