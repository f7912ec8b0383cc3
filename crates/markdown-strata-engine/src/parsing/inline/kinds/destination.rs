//! Link destination, title and label grammar shared by inline links,
//! images and link reference definitions.

use crate::parsing::points::{NodePoint, Span, chars::is_escapable};

const MAX_LABEL_LEN: usize = 999;
const MAX_PAREN_DEPTH: usize = 32;

/// Scans a destination at `start`; returns the content span (without
/// angle brackets) and the index after the destination.
pub fn eat_link_destination(points: &[NodePoint], start: usize, end: usize) -> Option<(Span, usize)> {
    let end = end.min(points.len());
    let at = |i: usize| (i < end).then(|| points[i].code_point);

    if at(start) == Some('<') {
        let mut i = start + 1;
        loop {
            match at(i)? {
                '>' => return Some((Span::new(start + 1, i), i + 1)),
                '\n' | '<' => return None,
                '\\' if at(i + 1).is_some_and(is_escapable) => i += 2,
                _ => i += 1,
            }
        }
    }

    let mut depth = 0usize;
    let mut i = start;
    while let Some(c) = at(i) {
        match c {
            '\\' if at(i + 1).is_some_and(is_escapable) => {
                i += 2;
                continue;
            }
            '(' => {
                depth += 1;
                if depth > MAX_PAREN_DEPTH {
                    return None;
                }
            }
            ')' => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            c if c == ' ' || c.is_ascii_control() => break,
            _ => {}
        }
        i += 1;
    }
    if i == start || depth != 0 {
        return None;
    }
    Some((Span::new(start, i), i))
}

/// Outcome of scanning a link title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleScan {
    /// Content span (without delimiters) and the index after the title.
    Closed(Span, usize),
    /// Input ended before the closing delimiter.
    Unclosed,
    Invalid,
}

/// Scans a `"…"`, `'…'` or `(…)` title at `start`.
pub fn eat_link_title(points: &[NodePoint], start: usize, end: usize) -> TitleScan {
    let end = end.min(points.len());
    let at = |i: usize| (i < end).then(|| points[i].code_point);

    let close = match at(start) {
        Some('"') => '"',
        Some('\'') => '\'',
        Some('(') => ')',
        _ => return TitleScan::Invalid,
    };
    let mut i = start + 1;
    while let Some(c) = at(i) {
        match c {
            c if c == close => return TitleScan::Closed(Span::new(start + 1, i), i + 1),
            '(' if close == ')' => return TitleScan::Invalid,
            '\\' if at(i + 1).is_some_and(is_escapable) => i += 1,
            '\n' => {
                let mut j = i + 1;
                while at(j) == Some(' ') {
                    j += 1;
                }
                if at(j) == Some('\n') {
                    return TitleScan::Invalid;
                }
            }
            _ => {}
        }
        i += 1;
    }
    TitleScan::Unclosed
}

/// Scans a `[label]` at `start`; returns the content span and the index
/// after the closing bracket.
pub fn eat_link_label(points: &[NodePoint], start: usize, end: usize) -> Option<(Span, usize)> {
    let end = end.min(points.len());
    let at = |i: usize| (i < end).then(|| points[i].code_point);
    if at(start) != Some('[') {
        return None;
    }
    let mut i = start + 1;
    let mut has_content = false;
    loop {
        if i - start > MAX_LABEL_LEN {
            return None;
        }
        match at(i)? {
            ']' => break,
            '[' => return None,
            '\\' if at(i + 1).is_some_and(is_escapable) => {
                has_content = true;
                i += 1;
            }
            c if !c.is_whitespace() => has_content = true,
            _ => {}
        }
        i += 1;
    }
    has_content.then_some((Span::new(start + 1, i), i + 1))
}

/// Parts of an inline link tail `(destination "title")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTail {
    pub destination: Option<Span>,
    pub title: Option<Span>,
    /// Index after the closing parenthesis.
    pub end: usize,
}

/// Scans `(destination "title")` at `start`, allowing whitespace with at
/// most one line ending around each part.
pub fn eat_inline_link_tail(points: &[NodePoint], start: usize, end: usize) -> Option<LinkTail> {
    let end = end.min(points.len());
    let at = |i: usize| (i < end).then(|| points[i].code_point);
    if at(start) != Some('(') {
        return None;
    }
    let mut i = skip_whitespace(points, start + 1, end);
    if at(i) == Some(')') {
        return Some(LinkTail {
            destination: None,
            title: None,
            end: i + 1,
        });
    }

    let (destination, after) = eat_link_destination(points, i, end)?;
    i = skip_whitespace(points, after, end);
    if at(i) == Some(')') {
        return Some(LinkTail {
            destination: Some(destination),
            title: None,
            end: i + 1,
        });
    }
    if i == after {
        return None;
    }

    let TitleScan::Closed(title, after) = eat_link_title(points, i, end) else {
        return None;
    };
    i = skip_whitespace(points, after, end);
    (at(i) == Some(')')).then_some(LinkTail {
        destination: Some(destination),
        title: Some(title),
        end: i + 1,
    })
}

/// Skips spaces and at most one line ending.
fn skip_whitespace(points: &[NodePoint], start: usize, end: usize) -> usize {
    let mut i = start;
    let mut newline = false;
    while i < end {
        match points[i].code_point {
            ' ' => {}
            '\n' if !newline => newline = true,
            _ => break,
        }
        i += 1;
    }
    i
}
