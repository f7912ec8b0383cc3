//! Reproducing and decoding text from points.

use std::sync::OnceLock;

use regex::Regex;

use super::{chars::is_escapable, point::NodePoint};

static CHARACTER_REFERENCE: OnceLock<Regex> = OnceLock::new();

fn character_reference_regex() -> &'static Regex {
    CHARACTER_REFERENCE.get_or_init(|| {
        Regex::new(r"^&(?:#[xX]([0-9a-fA-F]{1,6})|#([0-9]{1,7})|[A-Za-z][A-Za-z0-9]{1,31});")
            .expect("Invalid character reference regex")
    })
}

/// Rebuilds the source text of `points[start..end]`.
///
/// A tab whose columns all fall inside the range is emitted as `\t`;
/// columns of a partially covered tab are emitted as spaces.
pub fn literal(points: &[NodePoint], start: usize, end: usize) -> String {
    let end = end.min(points.len());
    let mut out = String::with_capacity(end.saturating_sub(start));
    let mut i = start;
    while i < end {
        let point = &points[i];
        match point.tab {
            Some(tab) if tab.index == 0 && i + tab.width as usize <= end => {
                out.push('\t');
                i += tab.width as usize;
            }
            _ => {
                out.push(point.code_point);
                i += 1;
            }
        }
    }
    out
}

/// Resolves backslash escapes and character references.
pub fn unescape_and_decode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => {
                let mut tail = rest[1..].chars();
                match tail.next() {
                    Some(next) if is_escapable(next) => {
                        out.push(next);
                        rest = &rest[1 + next.len_utf8()..];
                    }
                    _ => {
                        out.push('\\');
                        rest = &rest[1..];
                    }
                }
            }
            '&' => match decode_reference_prefix(rest) {
                Some((decoded, consumed)) => {
                    out.push_str(&decoded);
                    rest = &rest[consumed..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            c => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    out
}

/// Decodes a character reference at the start of `text`, returning the
/// decoded string and the number of bytes consumed.
fn decode_reference_prefix(text: &str) -> Option<(String, usize)> {
    let caps = character_reference_regex().captures(text)?;
    let whole = caps.get(0)?;
    let decoded = if let Some(hex) = caps.get(1) {
        numeric_reference(u32::from_str_radix(hex.as_str(), 16).ok())
    } else if let Some(dec) = caps.get(2) {
        numeric_reference(dec.as_str().parse::<u32>().ok())
    } else {
        let decoded = html_escape::decode_html_entities(whole.as_str());
        if decoded == whole.as_str() {
            return None;
        }
        decoded.into_owned()
    };
    Some((decoded, whole.end()))
}

fn numeric_reference(value: Option<u32>) -> String {
    value
        .filter(|&v| v != 0)
        .and_then(char::from_u32)
        .unwrap_or('\u{FFFD}')
        .to_string()
}

/// Normalizes a link label into a matching identifier: surrounding
/// whitespace trimmed, inner whitespace collapsed to one space, case folded.
pub fn normalize_identifier(label: &str) -> String {
    let collapsed = label.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase().to_uppercase().to_lowercase()
}
