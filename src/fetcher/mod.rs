pub mod http_fetcher;
pub mod locator;

use async_trait::async_trait;

use crate::app::Result;

pub use http_fetcher::HttpFetcher;
pub use locator::{FeedLocator, ResolvedFeed, Unresolved, MAX_DISCOVERY_HOPS};

/// HTTP capability used by the locator and the relay dispatcher.
///
/// Implementations treat any status outside 2xx/3xx as an error.
#[async_trait]
pub trait Fetcher {
    /// GET `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// POST `body` to `url` with the given extra headers.
    async fn post(&self, url: &str, headers: &[(&str, String)], body: &str) -> Result<()>;
}
