pub mod relay;

use std::fmt;
use std::sync::Arc;

use crate::app::{FeedbellError, Result};
use crate::domain::{FeedSnapshot, Fingerprint, Topic};
use crate::fetcher::Fetcher;

pub use relay::{parse_cache, RelayMessage};

pub const DEFAULT_SERVER: &str = "https://ntfy.sh";

/// Relay message priority, 1 (min) to 5 (max).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to a changed feed at the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Notification posted.
    Sent,
    /// The relay already holds a matching notification.
    Suppressed,
    /// Not suppressed, but posting was disabled for this run.
    DryRun,
}

/// Posts notifications to a topic relay after checking the relay's own
/// cache, so a lost local store or a second instance never causes a repeat.
pub struct Dispatcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    server: String,
}

impl Dispatcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, server: impl Into<String>) -> Self {
        let server = server.into().trim_end_matches('/').to_string();
        Self { fetcher, server }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn topic_url(&self, topic: &Topic) -> String {
        format!("{}/{}", self.server, topic.slug())
    }

    pub fn cache_url(&self, topic: &Topic) -> String {
        format!("{}/json?poll=1", self.topic_url(topic))
    }

    /// Check the relay cache for `content`, then post unless it is already
    /// there or `dry_run` is set.
    pub async fn reconcile_and_send(
        &self,
        topic: &Topic,
        snapshot: &FeedSnapshot,
        content: Fingerprint,
        priority: Priority,
        dry_run: bool,
    ) -> Result<Dispatch> {
        if let Some(cached) = self.find_cached(topic, content).await? {
            tracing::info!(
                topic = %topic.slug(),
                id = cached.id.as_deref().unwrap_or("?"),
                sent_at = %format_time(cached.time),
                "Relay already delivered this entry"
            );
            return Ok(Dispatch::Suppressed);
        }

        if dry_run {
            tracing::info!(
                topic = %topic.slug(),
                title = %snapshot.entry_title,
                "Dry run, not posting"
            );
            return Ok(Dispatch::DryRun);
        }

        self.send(topic, snapshot, priority).await?;
        Ok(Dispatch::Sent)
    }

    /// The first cached relay message whose fingerprint equals `content`.
    pub async fn find_cached(
        &self,
        topic: &Topic,
        content: Fingerprint,
    ) -> Result<Option<RelayMessage>> {
        let url = self.cache_url(topic);
        let body = self
            .fetcher
            .fetch(&url)
            .await
            .map_err(|e| FeedbellError::Dispatch(format!("polling {}: {}", url, e)))?;
        let body = String::from_utf8_lossy(&body);

        let cached = parse_cache(&body);
        tracing::debug!(%url, entries = cached.len(), "Polled relay cache");
        Ok(cached.into_iter().find(|m| m.fingerprint() == content))
    }

    pub async fn send(&self, topic: &Topic, snapshot: &FeedSnapshot, priority: Priority) -> Result<()> {
        let url = self.topic_url(topic);
        let headers = [
            ("Title", snapshot.feed_title.clone()),
            ("Click", snapshot.entry_link.clone()),
            ("Actions", format!("view, Open link, {}", snapshot.entry_link)),
            ("Priority", priority.to_string()),
        ];

        self.fetcher
            .post(&url, &headers, &snapshot.entry_title)
            .await
            .map_err(|e| match e {
                FeedbellError::Dispatch(_) => e,
                other => FeedbellError::Dispatch(format!("posting to {}: {}", url, other)),
            })?;

        tracing::info!(topic = %topic.slug(), title = %snapshot.entry_title, "Notification sent");
        Ok(())
    }
}

fn format_time(time: Option<i64>) -> String {
    time.and_then(|t| chrono::DateTime::from_timestamp(t, 0))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}
