use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};

use crate::app::{FeedbellError, Result};
use crate::fetcher::Fetcher;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("feedbell/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedbellError::ToolUnavailable(format!("HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn check_status(url: &str, response: &Response) -> Result<()> {
        let status = response.status();
        if status.is_success() || status.is_redirection() {
            Ok(())
        } else {
            Err(FeedbellError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

/// Header values may carry UTF-8 but never control characters.
fn header_value(raw: &str) -> Result<HeaderValue> {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_bytes(cleaned.trim().as_bytes())
        .map_err(|e| FeedbellError::Dispatch(format!("invalid header value {:?}: {}", raw, e)))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::check_status(url, &response)?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn post(&self, url: &str, headers: &[(&str, String)], body: &str) -> Result<()> {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| FeedbellError::Dispatch(format!("invalid header {}: {}", name, e)))?;
            map.insert(name, header_value(value)?);
        }

        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .headers(map)
            .body(body.to_string())
            .send()
            .await?;
        Self::check_status(url, &response)
    }
}
