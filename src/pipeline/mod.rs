//! Per-feed check-and-notify loop.
//!
//! ```text
//! locate → fetch → parse → topic → fingerprint → store → relay
//! ```
//!
//! Feeds are handled one after another in the order given. A failure in
//! one feed is counted and the loop moves on; errors that undermine
//! duplicate suppression itself stop the run.

use std::fmt;

use crate::app::{AppContext, FeedbellError, Result};
use crate::domain::{FeedSnapshot, Fingerprint, Topic};
use crate::notify::{Dispatch, Priority};

/// How the relay topic is chosen when none is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopicMode {
    /// Derive the topic from the first parsed feed and reuse it for every
    /// later feed in the run.
    #[default]
    Sticky,
    /// Derive a topic from each feed's own title.
    PerFeed,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub topic: Option<Topic>,
    pub topic_mode: TopicMode,
    pub priority: Priority,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// Leading entry matches the stored fingerprint.
    Unchanged,
    Sent,
    Suppressed,
    DryRun,
}

impl From<Dispatch> for FeedOutcome {
    fn from(dispatch: Dispatch) -> Self {
        match dispatch {
            Dispatch::Sent => FeedOutcome::Sent,
            Dispatch::Suppressed => FeedOutcome::Suppressed,
            Dispatch::DryRun => FeedOutcome::DryRun,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: usize,
    pub suppressed: usize,
    pub unchanged: usize,
    pub dry_run: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: FeedOutcome) {
        match outcome {
            FeedOutcome::Unchanged => self.unchanged += 1,
            FeedOutcome::Sent => self.sent += 1,
            FeedOutcome::Suppressed => self.suppressed += 1,
            FeedOutcome::DryRun => self.dry_run += 1,
        }
    }

    /// Process exit status: the number of failed feeds, saturating at 255.
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.failed).unwrap_or(u8::MAX)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sent, {} suppressed, {} unchanged, {} dry-run, {} failed",
            self.sent, self.suppressed, self.unchanged, self.dry_run, self.failed
        )
    }
}

pub struct Pipeline<'a> {
    ctx: &'a AppContext,
    options: RunOptions,
    sticky_topic: Option<Topic>,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a AppContext, options: RunOptions) -> Self {
        Self {
            ctx,
            options,
            sticky_topic: None,
        }
    }

    /// The topic captured so far in [`TopicMode::Sticky`] runs.
    pub fn sticky_topic(&self) -> Option<&Topic> {
        self.sticky_topic.as_ref()
    }

    pub async fn run(&mut self, urls: &[String]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for url in urls {
            match self.process_feed(url).await {
                Ok(outcome) => {
                    tracing::info!(%url, ?outcome, "Feed processed");
                    summary.record(outcome);
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(%url, error = %e, "Aborting run");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(%url, error = %e, "Feed failed");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!("Run complete: {}", summary);
        Ok(summary)
    }

    pub async fn process_feed(&mut self, url: &str) -> Result<FeedOutcome> {
        let resolved = self.ctx.locator.resolve(url).await.map_err(|unresolved| {
            tracing::debug!(fallback = %unresolved.fallback, "Feed location unresolved");
            unresolved.error
        })?;

        let snapshot = self.ctx.normalizer.parse(&resolved.body)?;
        let topic = self.topic_for(&snapshot)?;
        let content = snapshot.content_fingerprint();

        let previous = self.ctx.store.read(&topic, &snapshot.feed_title)?;
        if previous == Some(content) {
            tracing::debug!(%url, %content, "Leading entry unchanged");
            return Ok(FeedOutcome::Unchanged);
        }

        self.ctx.store.write(&topic, &snapshot.feed_title, content)?;
        let recorded = self
            .ctx
            .store
            .read(&topic, &snapshot.feed_title)?
            .ok_or_else(|| {
                FeedbellError::Io(std::io::Error::other("dedup record missing after write"))
            })?;

        match self.dispatch(&topic, &snapshot, recorded).await {
            Ok(dispatch) => Ok(dispatch.into()),
            Err(e) => {
                // Roll back so the next invocation retries delivery.
                self.restore(&topic, &snapshot.feed_title, previous)?;
                Err(e)
            }
        }
    }

    async fn dispatch(
        &self,
        topic: &Topic,
        snapshot: &FeedSnapshot,
        content: Fingerprint,
    ) -> Result<Dispatch> {
        self.ctx
            .dispatcher
            .reconcile_and_send(
                topic,
                snapshot,
                content,
                self.options.priority,
                self.options.dry_run,
            )
            .await
    }

    fn restore(&self, topic: &Topic, feed_title: &str, previous: Option<Fingerprint>) -> Result<()> {
        match previous {
            Some(fingerprint) => self.ctx.store.write(topic, feed_title, fingerprint),
            None => self.ctx.store.remove(topic, feed_title),
        }
    }

    fn topic_for(&mut self, snapshot: &FeedSnapshot) -> Result<Topic> {
        if let Some(topic) = &self.options.topic {
            return Ok(topic.clone());
        }

        match self.options.topic_mode {
            TopicMode::PerFeed => Topic::from_title(&snapshot.feed_title),
            TopicMode::Sticky => {
                if let Some(topic) = &self.sticky_topic {
                    return Ok(topic.clone());
                }
                let topic = Topic::from_title(&snapshot.feed_title)?;
                tracing::info!(%topic, "Derived topic from feed title");
                self.sticky_topic = Some(topic.clone());
                Ok(topic)
            }
        }
    }
}
