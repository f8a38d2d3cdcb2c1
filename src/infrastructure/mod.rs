pub mod http_fetcher;
pub mod pacer;

pub use http_fetcher::{FetchResponse, Fetcher, HttpFetcher};
pub use pacer::Pacer;
