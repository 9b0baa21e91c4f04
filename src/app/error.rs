use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedbellError {
    #[error("Required capability unavailable: {0}")]
    ToolUnavailable(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("No feed discovered at {0}")]
    NoFeedDiscovered(String),

    #[error("Gave up resolving {url} after {hops} discovery hops")]
    TooManyRedirects { url: String, hops: usize },

    #[error("Incomplete feed data: missing {0}")]
    IncompleteFeedData(&'static str),

    #[error("Cannot derive a relay topic from {0:?}")]
    InvalidTopic(String),

    #[error("Fingerprint error: {0}")]
    Compute(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FeedbellError {
    /// Errors that leave the environment in a state where duplicate
    /// suppression can no longer be trusted. These abort the whole run
    /// instead of being counted against a single feed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ToolUnavailable(_) | Self::Compute(_) | Self::Io(_) | Self::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedbellError>;
