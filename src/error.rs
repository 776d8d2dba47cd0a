//! Failure reasons for each pipeline stage.
//!
//! None of these escape to the shell: search errors become a warning,
//! fetch errors drop a single page, generation errors become the answer text.

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("not an HTML page (content-type: {0})")]
    NotHtml(String),

    #[error("no extractable content")]
    NoContent,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("prompt blocked: {0}")]
    Blocked(String),

    #[error("model returned no text")]
    EmptyResponse,
}
