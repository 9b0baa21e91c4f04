pub mod entities;
pub mod scan;

use crate::app::{FeedbellError, Result};
use crate::domain::FeedSnapshot;

pub use entities::decode;

/// Feed flavour, decided by which entry element the body uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Atom,
    Rss,
}

impl FeedKind {
    pub fn detect(body: &str) -> Self {
        if scan::find_open_tag(body, "entry").is_some() {
            FeedKind::Atom
        } else {
            FeedKind::Rss
        }
    }

    fn entry_tag(self) -> &'static str {
        match self {
            FeedKind::Atom => "entry",
            FeedKind::Rss => "item",
        }
    }
}

/// Extracts the feed title and the leading entry from Atom or RSS markup.
///
/// Only the first entry is ever looked at. Malformed markup (missing closing
/// tags, empty elements) surfaces as [`FeedbellError::IncompleteFeedData`].
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, body: &str) -> Result<FeedSnapshot> {
        let kind = FeedKind::detect(body);
        let entry_tag = kind.entry_tag();

        // Channel-level metadata lives before the first entry closes.
        let head_end = scan::find_close_tag(body, entry_tag).unwrap_or(body.len());
        let feed_title = scan::element_text(&body[..head_end], "title")
            .map(clean)
            .unwrap_or_default();

        let entry = match scan::find_open_tag(body, entry_tag) {
            Some(open) => {
                let region = &body[open.start..];
                match scan::find_close_tag(region, entry_tag) {
                    Some(close) => &region[..close],
                    None => region,
                }
            }
            None => "",
        };

        let entry_title = scan::element_text(entry, "title")
            .map(clean)
            .unwrap_or_default();

        let entry_link = match kind {
            FeedKind::Atom => scan::find_open_tag(entry, "link")
                .and_then(|range| scan::attribute(&entry[range], "href"))
                .map(clean),
            FeedKind::Rss => scan::element_text(entry, "link").map(clean),
        }
        .unwrap_or_default();

        tracing::trace!(?kind, %feed_title, %entry_title, %entry_link, "Scanned feed");

        if feed_title.is_empty() {
            return Err(FeedbellError::IncompleteFeedData("feed title"));
        }
        if entry_title.is_empty() {
            return Err(FeedbellError::IncompleteFeedData("entry title"));
        }
        if entry_link.is_empty() {
            return Err(FeedbellError::IncompleteFeedData("entry link"));
        }

        Ok(FeedSnapshot {
            feed_title,
            entry_title,
            entry_link,
        })
    }
}

/// Decode, then replace control characters with spaces so the text matches
/// what the relay stores from a notification header.
fn clean(raw: &str) -> String {
    decode(raw)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Test Feed</title>
    <link>https://example.com/</link>
    <atom:link href="https://example.com/feed.xml" rel="self"/>
    <description>A test feed</description>
    <item>
      <title>Test Item 1</title>
      <link>https://example.com/item1</link>
      <guid>item-1</guid>
    </item>
    <item>
      <title>Test Item 2</title>
      <link>https://example.com/item2</link>
    </item>
  </channel>
</rss>"#;

    const ATOM_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Blog</title>
  <link href="https://ex.com/" rel="alternate"/>
  <entry>
    <title>Hello World</title>
    <link href="https://ex.com/1"/>
    <id>atom-entry-1</id>
  </entry>
  <entry>
    <title>Older Post</title>
    <link href="https://ex.com/0"/>
  </entry>
</feed>"#;

    #[test]
    fn test_detect_kind() {
        assert_eq!(FeedKind::detect(ATOM_SAMPLE), FeedKind::Atom);
        assert_eq!(FeedKind::detect(RSS_SAMPLE), FeedKind::Rss);
        assert_eq!(
            FeedKind::detect("<feed><entry xml:lang=\"en\"></entry></feed>"),
            FeedKind::Atom
        );
    }

    #[test]
    fn test_parse_atom() {
        let snapshot = Normalizer::new().parse(ATOM_SAMPLE).unwrap();
        assert_eq!(
            snapshot,
            FeedSnapshot::new("Example Blog", "Hello World", "https://ex.com/1")
        );
    }

    #[test]
    fn test_parse_atom_ignores_channel_link() {
        let snapshot = Normalizer::new().parse(ATOM_SAMPLE).unwrap();
        assert_ne!(snapshot.entry_link, "https://ex.com/");
    }

    #[test]
    fn test_parse_rss() {
        let snapshot = Normalizer::new().parse(RSS_SAMPLE).unwrap();
        assert_eq!(snapshot.feed_title, "Test Feed");
        assert_eq!(snapshot.entry_title, "Test Item 1");
        assert_eq!(snapshot.entry_link, "https://example.com/item1");
    }

    #[test]
    fn test_parse_rss_link_from_element_text() {
        let body = "<rss><channel><title>Chan</title>\
                    <item><title>Post</title><link>http://x/1</link></item>\
                    </channel></rss>";
        let snapshot = Normalizer::new().parse(body).unwrap();
        assert_eq!(snapshot.entry_link, "http://x/1");
    }

    #[test]
    fn test_parse_decodes_entities_and_cdata() {
        let body = r#"<rss><channel>
            <title>Tom &amp; Jerry&#39;s</title>
            <item>
              <title><![CDATA[Caf&eacute; <b>opens</b>]]></title>
              <link> https://ex.com/?a=1&amp;b=2 </link>
            </item>
        </channel></rss>"#;
        let snapshot = Normalizer::new().parse(body).unwrap();
        assert_eq!(snapshot.feed_title, "Tom & Jerry's");
        assert_eq!(snapshot.entry_title, "Café <b>opens</b>");
        assert_eq!(snapshot.entry_link, "https://ex.com/?a=1&b=2");
    }

    #[test]
    fn test_parse_tolerates_attributes_and_case() {
        let body = r#"<FEED><TITLE type="text">Loud</TITLE>
            <Entry xml:lang="en"><Title type="html">Shout</Title>
            <LINK rel="alternate" HREF='https://loud.example/1'/></Entry></FEED>"#;
        let snapshot = Normalizer::new().parse(body).unwrap();
        assert_eq!(
            snapshot,
            FeedSnapshot::new("Loud", "Shout", "https://loud.example/1")
        );
    }

    #[test]
    fn test_missing_entry_is_incomplete() {
        let body = "<rss><channel><title>Empty</title></channel></rss>";
        let err = Normalizer::new().parse(body).unwrap_err();
        assert!(matches!(err, FeedbellError::IncompleteFeedData("entry title")));
    }

    #[test]
    fn test_feed_title_taken_before_first_entry_closes() {
        // Without a channel title, the first title before `</item>` wins.
        let body = "<rss><channel><item><title>Post</title><link>http://x/1</link></item>";
        let snapshot = Normalizer::new().parse(body).unwrap();
        assert_eq!(snapshot.feed_title, "Post");
        assert_eq!(snapshot.entry_title, "Post");
    }

    #[test]
    fn test_empty_feed_title_is_incomplete() {
        let body = "<rss><title>  </title><item><title>Post</title><link>http://x/1</link></item>";
        let err = Normalizer::new().parse(body).unwrap_err();
        assert!(matches!(err, FeedbellError::IncompleteFeedData("feed title")));
    }

    #[test]
    fn test_unclosed_link_is_incomplete_not_panic() {
        let body = "<rss><title>T</title><item><title>Post</title><link>http://x/1";
        let err = Normalizer::new().parse(body).unwrap_err();
        assert!(matches!(err, FeedbellError::IncompleteFeedData("entry link")));
    }

    #[test]
    fn test_first_entry_link_not_borrowed_from_second() {
        let body = "<rss><title>T</title>\
                    <item><title>No link</title></item>\
                    <item><title>Second</title><link>http://x/2</link></item></rss>";
        let err = Normalizer::new().parse(body).unwrap_err();
        assert!(matches!(err, FeedbellError::IncompleteFeedData("entry link")));
    }

    #[test]
    fn test_control_characters_become_spaces() {
        let body = "<feed><title>Example\n\tBlog</title>\
                    <entry><title>Line\r\nbreak</title><link href=\"https://ex.com/1\"/></entry></feed>";
        let snapshot = Normalizer::new().parse(body).unwrap();
        assert_eq!(snapshot.feed_title, "Example  Blog");
        assert_eq!(snapshot.entry_title, "Line  break");
    }

    #[test]
    fn test_garbage_input() {
        let err = Normalizer::new().parse("<html><body>nope</body></html>").unwrap_err();
        assert!(matches!(err, FeedbellError::IncompleteFeedData(_)));
    }
}
