use crate::domain::fingerprint::Fingerprint;

/// The decoded leading entry of one feed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSnapshot {
    pub feed_title: String,
    pub entry_title: String,
    pub entry_link: String,
}

impl FeedSnapshot {
    pub fn new(
        feed_title: impl Into<String>,
        entry_title: impl Into<String>,
        entry_link: impl Into<String>,
    ) -> Self {
        Self {
            feed_title: feed_title.into(),
            entry_title: entry_title.into(),
            entry_link: entry_link.into(),
        }
    }

    /// Fingerprint used to decide whether the leading entry changed.
    ///
    /// Field order matches what the relay echoes back as
    /// `(title, message, url)` for a delivered notification.
    pub fn content_fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&[&self.feed_title, &self.entry_title, &self.entry_link])
    }
}
