//! Reading the relay's recent-message cache.
//!
//! The relay answers `GET <server>/<topic>/json?poll=1` with one JSON object
//! per line. Besides `message` events it may emit `open` or `keepalive`
//! lines, which carry no content and are skipped.

use serde::Deserialize;

use crate::domain::Fingerprint;
use crate::normalizer::decode;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayAction {
    #[serde(default)]
    pub url: Option<String>,
}

/// One cached notification as the relay reports it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub click: Option<String>,
    #[serde(default)]
    pub actions: Vec<RelayAction>,
}

impl RelayMessage {
    pub fn is_message(&self) -> bool {
        self.event.as_deref().is_none_or(|e| e == "message")
    }

    /// The link this notification pointed at: an explicit `url`, else the
    /// click target, else the first action's URL.
    pub fn link(&self) -> &str {
        self.url
            .as_deref()
            .or(self.click.as_deref())
            .or_else(|| self.actions.iter().find_map(|a| a.url.as_deref()))
            .unwrap_or("")
    }

    /// Fingerprint comparable with [`FeedSnapshot::content_fingerprint`].
    ///
    /// [`FeedSnapshot::content_fingerprint`]: crate::domain::FeedSnapshot::content_fingerprint
    pub fn fingerprint(&self) -> Fingerprint {
        let title = decode(self.title.as_deref().unwrap_or(""));
        let message = decode(self.message.as_deref().unwrap_or(""));
        let link = decode(self.link());
        Fingerprint::of(&[title.trim(), message.trim(), link.trim()])
    }
}

/// Parse a newline-delimited poll response. Undecodable lines are skipped.
pub fn parse_cache(body: &str) -> Vec<RelayMessage> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<RelayMessage>(line) {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable relay cache line");
                None
            }
        })
        .filter(RelayMessage::is_message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeedSnapshot;

    #[test]
    fn test_parse_cache_skips_noise() {
        let body = concat!(
            r#"{"id":"a","time":1700000000,"event":"open","topic":"t"}"#,
            "\n\n",
            "not json\n",
            r#"{"id":"b","time":1700000001,"event":"message","topic":"t","title":"Blog","message":"Post","click":"https://ex.com/1"}"#,
            "\n",
            r#"{"id":"c","event":"keepalive"}"#,
            "\n",
        );
        let messages = parse_cache(body);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id.as_deref(), Some("b"));
    }

    #[test]
    fn test_link_precedence() {
        let mut message = RelayMessage {
            actions: vec![RelayAction {
                url: Some("https://action".into()),
            }],
            ..Default::default()
        };
        assert_eq!(message.link(), "https://action");
        message.click = Some("https://click".into());
        assert_eq!(message.link(), "https://click");
        message.url = Some("https://url".into());
        assert_eq!(message.link(), "https://url");
    }

    #[test]
    fn test_fingerprint_matches_snapshot_after_decoding() {
        let snapshot = FeedSnapshot::new("Tom & Jerry", "Café", "https://ex.com/?a=1&b=2");
        let body = r#"{"event":"message","title":"Tom & Jerry","message":"Caf\\u00e9","click":"https://ex.com/?a=1&amp;b=2"}"#;
        let messages = parse_cache(body);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].fingerprint(), snapshot.content_fingerprint());
    }

    #[test]
    fn test_missing_fields_do_not_match() {
        let snapshot = FeedSnapshot::new("Blog", "Post", "https://ex.com/1");
        let message = RelayMessage {
            title: Some("Blog".into()),
            message: Some("Post".into()),
            ..Default::default()
        };
        assert_ne!(message.fingerprint(), snapshot.content_fingerprint());
    }
}
