//! Character-entity normalization.
//!
//! Feed fields and relay messages arrive with any mix of CDATA wrappers,
//! JSON `\uXXXX` escapes, XML predefined entities and HTML named or numeric
//! references. [`decode`] strips all of them down to literal text.

use html_escape::decode_html_entities;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

const XML_ENTITIES: &[(&str, &str)] = &[
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&amp;", "&"),
];

/// Decode `input` until no known entity or escape remains.
///
/// Each pass unwraps CDATA, then decodes unicode escapes, XML entities and
/// HTML entities, each stage working on the previous stage's output. Passes
/// repeat until the text stops changing, so double-escaped input such as
/// `&amp;lt;` ends up as `<` and `decode(decode(s)) == decode(s)`. Every
/// substitution shortens the text, which bounds the loop.
pub fn decode(input: &str) -> String {
    let mut current = input.to_string();
    loop {
        let next = decode_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn decode_pass(input: &str) -> String {
    let text = unwrap_cdata(input);
    let text = decode_unicode_escapes(text);
    let text = decode_xml_entities(&text);
    decode_html_entities(&text).into_owned()
}

/// Keep only the content of the first CDATA section, if there is one.
pub fn unwrap_cdata(input: &str) -> &str {
    let Some(open) = input.find(CDATA_OPEN) else {
        return input;
    };
    let inner = &input[open + CDATA_OPEN.len()..];
    match inner.find(CDATA_CLOSE) {
        Some(close) => &inner[..close],
        None => inner,
    }
}

pub fn decode_xml_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match XML_ENTITIES
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
        {
            Some((entity, literal)) => {
                out.push_str(literal);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace `\uXXXX` escapes, joining surrogate pairs. Lone surrogates are
/// left as written.
pub fn decode_unicode_escapes(input: &str) -> String {
    if !input.contains("\\u") {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find("\\u") {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let Some(unit) = hex_unit(rest) else {
            out.push_str("\\u");
            rest = &rest[2..];
            continue;
        };

        if (0xD800..0xDC00).contains(&unit) {
            if let Some(low) = rest.get(6..).and_then(hex_unit) {
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    if let Some(ch) = char::from_u32(combined) {
                        out.push(ch);
                        rest = &rest[12..];
                        continue;
                    }
                }
            }
        }

        match char::from_u32(unit) {
            Some(ch) => {
                out.push(ch);
                rest = &rest[6..];
            }
            None => {
                out.push_str(&rest[..6]);
                rest = &rest[6..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse the four hex digits of a `\uXXXX` escape at the start of `s`.
fn hex_unit(s: &str) -> Option<u32> {
    let digits = s.strip_prefix("\\u")?.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
