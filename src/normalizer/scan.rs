//! Tolerant tag scanning over loosely structured markup.
//!
//! Nothing here validates the document. Tags are located by indexed
//! substring search, ASCII case-insensitively, and every lookup returns
//! `None` rather than failing when a delimiter is missing.

use std::ops::Range;

/// Location of the first `<name ...>` open tag, covering `<` through `>`.
///
/// The tag name must be followed by `>`, `/` or whitespace, so `<link`
/// never matches `<linkage>` and `<atom:link>` never matches `<link`.
pub fn find_open_tag(haystack: &str, name: &str) -> Option<Range<usize>> {
    let lower = haystack.to_ascii_lowercase();
    let pattern = format!("<{}", name.to_ascii_lowercase());
    let bytes = lower.as_bytes();

    let mut from = 0;
    while let Some(pos) = lower[from..].find(&pattern) {
        let start = from + pos;
        let after = start + pattern.len();
        match bytes.get(after) {
            Some(b'>') | Some(b'/') => {}
            Some(b) if b.is_ascii_whitespace() => {}
            Some(_) => {
                from = after;
                continue;
            }
            None => return None,
        }
        let end = lower[after..].find('>')? + after + 1;
        return Some(start..end);
    }
    None
}

/// Byte offset of the first `</name>` closing tag.
pub fn find_close_tag(haystack: &str, name: &str) -> Option<usize> {
    let lower = haystack.to_ascii_lowercase();
    let pattern = format!("</{}", name.to_ascii_lowercase());
    let bytes = lower.as_bytes();

    let mut from = 0;
    while let Some(pos) = lower[from..].find(&pattern) {
        let start = from + pos;
        let after = start + pattern.len();
        match bytes.get(after) {
            Some(b'>') => return Some(start),
            Some(b) if b.is_ascii_whitespace() => return Some(start),
            Some(_) => from = after,
            None => return None,
        }
    }
    None
}

/// Raw text between the first `<name>` and the following `</name>`.
///
/// A self-closing tag yields an empty string; a missing closing tag yields
/// `None`.
pub fn element_text<'a>(haystack: &'a str, name: &str) -> Option<&'a str> {
    let open = find_open_tag(haystack, name)?;
    if haystack[open.clone()].ends_with("/>") {
        return Some("");
    }
    let rest = &haystack[open.end..];
    let close = find_close_tag(rest, name)?;
    Some(&rest[..close])
}

/// Value of `attr` inside a single tag such as `<link rel="x" href="y">`.
///
/// Accepts double-quoted, single-quoted and unquoted values.
pub fn attribute<'a>(tag: &'a str, attr: &str) -> Option<&'a str> {
    let lower = tag.to_ascii_lowercase();
    let name = attr.to_ascii_lowercase();
    let bytes = lower.as_bytes();

    let mut from = 0;
    while let Some(pos) = lower[from..].find(&name) {
        let start = from + pos;
        from = start + name.len();

        let at_boundary = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !at_boundary {
            continue;
        }

        let mut i = from;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        return match bytes.get(i) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = i + 1;
                let len = tag[value_start..].find(quote as char)?;
                Some(&tag[value_start..value_start + len])
            }
            Some(_) => {
                let len = tag[i..]
                    .find(|c: char| c.is_ascii_whitespace() || c == '>')
                    .unwrap_or(tag.len() - i);
                Some(&tag[i..i + len])
            }
            None => None,
        };
    }
    None
}

/// Every `<name ...>` open tag in document order.
pub fn open_tags<'a>(haystack: &'a str, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    let mut offset = 0;
    std::iter::from_fn(move || {
        let range = find_open_tag(&haystack[offset..], name)?;
        let tag = &haystack[offset + range.start..offset + range.end];
        offset += range.end;
        Some(tag)
    })
}
