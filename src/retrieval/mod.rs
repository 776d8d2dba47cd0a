pub mod aggregator;
pub mod extract;
pub mod fetcher;
pub mod search;

pub use aggregator::Aggregator;
pub use fetcher::{build_http_client, PageFetcher};
pub use search::SearchClient;
