use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::app::Result;
use crate::fetcher::{FeedLocator, Fetcher, HttpFetcher};
use crate::normalizer::Normalizer;
use crate::notify::Dispatcher;
use crate::store::{DedupStore, FileStore};

pub struct AppContext {
    pub store: Arc<dyn DedupStore + Send + Sync>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub locator: FeedLocator,
    pub normalizer: Normalizer,
    pub dispatcher: Dispatcher,
}

impl AppContext {
    /// File-backed context talking to `server` over HTTP.
    pub fn new(state_dir: &Path, server: &str, timeout: Duration) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::with_timeout(timeout)?);
        let store: Arc<dyn DedupStore + Send + Sync> = Arc::new(FileStore::new(state_dir));
        Ok(Self::with_parts(fetcher, store, server))
    }

    pub fn with_parts(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        store: Arc<dyn DedupStore + Send + Sync>,
        server: &str,
    ) -> Self {
        let locator = FeedLocator::new(fetcher.clone());
        let dispatcher = Dispatcher::new(fetcher.clone(), server);
        let normalizer = Normalizer::new();

        Self {
            store,
            fetcher,
            locator,
            normalizer,
            dispatcher,
        }
    }
}
