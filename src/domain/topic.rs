use std::fmt;

use crate::app::{FeedbellError, Result};

const DELIMITERS: &[char] = &['"', '\'', '&', '<', '>', ',', '.', '(', ')', '/'];

/// Reduce free text to a relay-safe identifier.
///
/// Splits on quotes, `&`, angle brackets, `,`, `.`, parentheses, `/` and
/// whitespace, then joins the non-empty fragments with `-`.
pub fn shortcodify(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace() || DELIMITERS.contains(&c))
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// A delivery channel on the notification relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic(String);

impl Topic {
    /// Wrap an operator-supplied topic. Rejects input that has no usable
    /// characters once slugified.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if shortcodify(&name).is_empty() {
            return Err(FeedbellError::InvalidTopic(name));
        }
        Ok(Self(name))
    }

    /// Derive a topic from a feed title.
    pub fn from_title(title: &str) -> Result<Self> {
        let slug = shortcodify(title);
        if slug.is_empty() {
            return Err(FeedbellError::InvalidTopic(title.to_string()));
        }
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier used in relay URLs.
    pub fn slug(&self) -> String {
        shortcodify(&self.0)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
