use futures::stream::{self, StreamExt};

use crate::config::Config;

use super::fetcher::PageFetcher;
use super::search::SearchClient;

/// Pages scraped for one query.
#[derive(Debug, Clone, Default)]
pub struct Gathered {
    /// Successful extractions, in search ranking order.
    pub contents: Vec<String>,
    pub urls_found: usize,
    /// Set when the search itself failed; shown to the user as a warning.
    pub search_warning: Option<String>,
}

pub struct Aggregator {
    search: SearchClient,
    fetcher: PageFetcher,
    workers: usize,
}

impl Aggregator {
    pub fn new(search: SearchClient, fetcher: PageFetcher, config: &Config) -> Self {
        Self {
            search,
            fetcher,
            workers: config.fetch_workers,
        }
    }

    pub async fn collect(&self, query: &str, desired_count: usize) -> Gathered {
        let urls = match self.search.search(query, desired_count).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                return Gathered {
                    search_warning: Some(format!("Search API error: {e}")),
                    ..Default::default()
                };
            }
        };

        let urls_found = urls.len();
        tracing::info!(urls_found, workers = self.workers, "scraping search results");

        let contents = self.fetch_all(&urls).await;
        tracing::info!(
            scraped = contents.len(),
            failed = urls_found - contents.len(),
            "scraping finished"
        );

        Gathered {
            contents,
            urls_found,
            search_warning: None,
        }
    }

    /// Fetch every URL with at most `workers` requests in flight.
    ///
    /// `buffered` yields in input order, so slot `i` always holds the result
    /// for `urls[i]` regardless of completion order.
    async fn fetch_all(&self, urls: &[String]) -> Vec<String> {
        let results: Vec<Option<String>> = stream::iter(urls)
            .map(|url| self.fetcher.fetch(url))
            .buffered(self.workers)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::retrieval::fetcher::build_http_client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn aggregator(server: &MockServer) -> Aggregator {
        let config = Config::for_tests(&format!("{}/search", server.uri()), "unused");
        let client = build_http_client().unwrap();
        Aggregator::new(
            SearchClient::new(client.clone(), &config),
            PageFetcher::new(client, &config),
            &config,
        )
    }

    async fn mount_search(server: &MockServer, paths: &[&str]) {
        let items: Vec<_> = paths
            .iter()
            .map(|p| json!({ "link": format!("{}{p}", server.uri()) }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
            .mount(server)
            .await;
    }

    async fn mount_page(server: &MockServer, page: &str, body: &str, delay_ms: u64) {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        format!("<html><body><p>{body}</p></body></html>"),
                        "text/html",
                    )
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn keeps_url_order_and_skips_failures() {
        let server = MockServer::start().await;
        mount_search(&server, &["/u1", "/u2", "/u3"]).await;
        // u1 finishes last; order must still follow the search ranking
        mount_page(&server, "/u1", "content one", 200).await;
        Mock::given(method("GET"))
            .and(path("/u2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_page(&server, "/u3", "content three", 0).await;

        let gathered = aggregator(&server).collect("q", 10).await;
        assert_eq!(gathered.contents, vec!["content one", "content three"]);
        assert_eq!(gathered.urls_found, 3);
        assert!(gathered.search_warning.is_none());
    }

    #[tokio::test]
    async fn no_urls_gives_empty_contents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let gathered = aggregator(&server).collect("q", 10).await;
        assert!(gathered.contents.is_empty());
        assert_eq!(gathered.urls_found, 0);
        assert!(gathered.search_warning.is_none());
    }

    #[tokio::test]
    async fn search_failure_becomes_warning() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let gathered = aggregator(&server).collect("q", 10).await;
        assert!(gathered.contents.is_empty());
        let warning = gathered.search_warning.unwrap();
        assert!(warning.starts_with("Search API error: "), "{warning}");
        assert!(warning.contains("bad key"));
    }

    #[tokio::test]
    async fn narrow_pool_still_fetches_everything_in_order() {
        let server = MockServer::start().await;
        let pages: Vec<String> = (0..20).map(|i| format!("/p{i}")).collect();
        let refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        mount_search(&server, &refs).await;
        for page in &pages {
            mount_page(&server, page, page, 20).await;
        }

        let mut agg = aggregator(&server);
        agg.workers = 3;
        let gathered = agg.collect("q", 20).await;
        assert_eq!(gathered.contents, pages);
    }

    #[tokio::test]
    async fn in_flight_fetches_never_exceed_worker_count() {
        let server = MockServer::start().await;
        let pages: Vec<String> = (0..9).map(|i| format!("/slow{i}")).collect();
        let refs: Vec<&str> = pages.iter().map(String::as_str).collect();
        mount_search(&server, &refs).await;
        for page in &pages {
            mount_page(&server, page, page, 200).await;
        }

        let mut agg = aggregator(&server);
        agg.workers = 3;
        let started = Instant::now();
        let gathered = agg.collect("q", 9).await;
        let elapsed = started.elapsed();

        // 9 pages of 200ms through 3 slots cannot finish in under 3 rounds
        assert_eq!(gathered.contents.len(), 9);
        assert!(elapsed >= Duration::from_millis(600), "took {elapsed:?}");

        let page_requests = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.url.path().starts_with("/slow"))
            .count();
        assert_eq!(page_requests, 9);
    }
}
