use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::app::{FeedbellError, Result};
use crate::fetcher::Fetcher;
use crate::normalizer::{decode, scan};

/// Upper bound on `<head>` discovery hops before giving up.
pub const MAX_DISCOVERY_HOPS: usize = 2;

const FEED_TYPES: &[&str] = &["application/rss+xml", "application/atom+xml"];

/// A URL confirmed to serve feed content, with the body fetched from it.
#[derive(Debug, Clone)]
pub struct ResolvedFeed {
    pub url: String,
    pub body: String,
}

/// Resolution failure. Carries the URL the caller started from so it can
/// fall back to it if the error is not worth acting on.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Unresolved {
    pub fallback: String,
    #[source]
    pub error: FeedbellError,
}

impl Unresolved {
    fn new(fallback: &str, error: FeedbellError) -> Self {
        Self {
            fallback: fallback.to_string(),
            error,
        }
    }
}

/// Turns an operator-supplied URL into one that serves Atom or RSS,
/// following `<link rel="alternate">`-style hints in HTML pages.
pub struct FeedLocator {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl FeedLocator {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self { fetcher }
    }

    pub async fn resolve(&self, url: &str) -> std::result::Result<ResolvedFeed, Unresolved> {
        let mut current = url.to_string();

        for hop in 0..=MAX_DISCOVERY_HOPS {
            let body = self
                .fetcher
                .fetch(&current)
                .await
                .map_err(|e| Unresolved::new(url, e))?;
            let body = String::from_utf8_lossy(&body).into_owned();

            if looks_like_feed(&body) {
                if hop > 0 {
                    tracing::info!(from = %url, to = %current, "Resolved feed location");
                }
                return Ok(ResolvedFeed { url: current, body });
            }

            let href = discover_link(&body).ok_or_else(|| {
                Unresolved::new(url, FeedbellError::NoFeedDiscovered(current.clone()))
            })?;
            let next = join_href(&current, &href).map_err(|e| Unresolved::new(url, e))?;

            tracing::debug!(hop, from = %current, to = %next, "Following feed link");
            current = next;
        }

        Err(Unresolved::new(
            url,
            FeedbellError::TooManyRedirects {
                url: url.to_string(),
                hops: MAX_DISCOVERY_HOPS,
            },
        ))
    }
}

/// True when the body opens like an XML document or an RSS/Atom root.
pub fn looks_like_feed(body: &str) -> bool {
    let start = body.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
    let prefix: String = start.chars().take(5).collect::<String>().to_ascii_lowercase();
    prefix.starts_with("<?xml") || prefix.starts_with("<rss") || prefix.starts_with("<feed")
}

/// `href` of the first feed `<link>` in the document head.
pub fn discover_link(html: &str) -> Option<String> {
    let head = match scan::find_close_tag(html, "head") {
        Some(end) => &html[..end],
        None => html,
    };

    scan::open_tags(head, "link")
        .filter(|tag| {
            scan::attribute(tag, "type")
                .map(|t| FEED_TYPES.iter().any(|ft| t.trim().eq_ignore_ascii_case(ft)))
                .unwrap_or(false)
        })
        .filter_map(|tag| scan::attribute(tag, "href"))
        .map(|href| decode(href).trim().to_string())
        .find(|href| !href.is_empty())
}

/// Make a discovered `href` absolute relative to the page it came from.
pub fn join_href(base: &str, href: &str) -> Result<String> {
    if href.contains("://") {
        return Ok(href.to_string());
    }

    let base_url = Url::parse(base)?;
    if let Some(rest) = href.strip_prefix("//") {
        return Ok(format!("{}://{}", base_url.scheme(), rest));
    }
    if href.starts_with('/') {
        let host = base_url.host_str().ok_or(url::ParseError::EmptyHost)?;
        let port = base_url
            .port()
            .map(|p| format!(":{}", p))
            .unwrap_or_default();
        return Ok(format!("{}://{}{}{}", base_url.scheme(), host, port, href));
    }

    Ok(format!("{}/{}", base.trim_end_matches('/'), href))
}
