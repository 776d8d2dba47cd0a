pub mod synthesizer;

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Instant;
use tracing::Instrument;

use crate::config::{Config, ResultCount};
use crate::llm::GeminiClient;
use crate::retrieval::{build_http_client, Aggregator, PageFetcher, SearchClient};
use crate::text::truncate_chars;

use synthesizer::{Synthesizer, SOURCE_SEPARATOR};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a question";
pub const NO_ARTICLES_MESSAGE: &str = "No articles found. Try a different query.";

/// Everything the shell shows after a successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id: String,
    pub timestamp: String,
    pub query: String,
    pub answer: String,
    pub generation_failed: bool,
    pub context: String,
    pub context_preview: String,
    pub urls_found: usize,
    pub pages_scraped: usize,
    pub scrape_latency_ms: u64,
    pub generation_latency_ms: u64,
    pub total_latency_ms: u64,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Report {
    pub fn summary(&self) -> String {
        format!(
            "Pages: {}/{} | Context chars: {} | Scrape: {:.1}s | Generation: {:.1}s | Tokens: {}",
            self.pages_scraped,
            self.urls_found,
            self.context.chars().count(),
            self.scrape_latency_ms as f64 / 1000.0,
            self.generation_latency_ms as f64 / 1000.0,
            self.input_tokens + self.output_tokens,
        )
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    EmptyQuery,
    /// Nothing to generate from: the search failed, found nothing, or every
    /// page failed to scrape.
    NoArticles { search_warning: Option<String> },
    Answered(Box<Report>),
}

/// Status updates emitted while a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Searching,
    Analyzing,
}

pub struct Assistant {
    aggregator: Aggregator,
    synthesizer: Synthesizer,
    config: Config,
}

impl Assistant {
    pub fn new(config: Config) -> Result<Self> {
        let http = build_http_client().context("Failed to build HTTP client")?;
        let llm = GeminiClient::new(
            http.clone(),
            &config.generation_api_key,
            &config.generation_endpoint,
        );

        Ok(Self {
            aggregator: Aggregator::new(
                SearchClient::new(http.clone(), &config),
                PageFetcher::new(http, &config),
                &config,
            ),
            synthesizer: Synthesizer::new(llm, config.generation_model.clone()),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn ask(
        &self,
        query: &str,
        count: ResultCount,
        mut on_phase: impl FnMut(Phase),
    ) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::EmptyQuery;
        }

        let id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("request", %id, query, count = count.get());

        async {
            let run_start = Instant::now();

            on_phase(Phase::Searching);
            let gathered = self.aggregator.collect(query, count.get()).await;
            let scrape_latency = run_start.elapsed().as_millis() as u64;

            if gathered.contents.is_empty() {
                tracing::info!(urls_found = gathered.urls_found, "no articles to analyze");
                return Outcome::NoArticles {
                    search_warning: gathered.search_warning,
                };
            }

            let context = self.build_context(&gathered.contents);

            on_phase(Phase::Analyzing);
            let gen_start = Instant::now();
            let generated = self.synthesizer.generate(query, &context).await;
            let generation_latency = gen_start.elapsed().as_millis() as u64;

            tracing::info!(
                pages = gathered.contents.len(),
                context_chars = context.chars().count(),
                generation_failed = generated.failed,
                "request finished"
            );

            Outcome::Answered(Box::new(Report {
                id: id.clone(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                query: query.to_string(),
                answer: generated.text,
                generation_failed: generated.failed,
                context_preview: self.preview(&context),
                context,
                urls_found: gathered.urls_found,
                pages_scraped: gathered.contents.len(),
                scrape_latency_ms: scrape_latency,
                generation_latency_ms: generation_latency,
                total_latency_ms: run_start.elapsed().as_millis() as u64,
                input_tokens: generated.input_tokens,
                output_tokens: generated.output_tokens,
            }))
        }
        .instrument(span)
        .await
    }

    /// Join pages with a blank line and cap the total length.
    fn build_context(&self, contents: &[String]) -> String {
        let joined = contents.join(SOURCE_SEPARATOR);
        truncate_chars(&joined, self.config.context_char_limit).to_string()
    }

    fn preview(&self, context: &str) -> String {
        format!(
            "{}...",
            truncate_chars(context, self.config.preview_char_limit)
        )
    }
}
