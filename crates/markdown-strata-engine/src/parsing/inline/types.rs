use std::any::Any;
use std::fmt;

use crate::parsing::{ast::NodeKind, points::Span};

/// Which side(s) of a construct a delimiter may stand for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Opener,
    Closer,
    Both,
    /// A self-contained construct found in one scan (autolink, raw HTML).
    Full,
}

impl DelimiterKind {
    pub fn can_open(self) -> bool {
        matches!(self, DelimiterKind::Opener | DelimiterKind::Both)
    }

    pub fn can_close(self) -> bool {
        matches!(self, DelimiterKind::Closer | DelimiterKind::Both)
    }
}

/// A candidate boundary marker, before pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub kind: DelimiterKind,
    pub start: usize,
    pub end: usize,
    pub marker: char,
    /// Remaining unpaired length of the run.
    pub thickness: usize,
    /// Length of the run as scanned.
    pub original_thickness: usize,
}

impl Delimiter {
    pub fn new(kind: DelimiterKind, start: usize, end: usize, marker: char) -> Self {
        Self {
            kind,
            start,
            end,
            marker,
            thickness: end - start,
            original_thickness: end - start,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// A paired construct awaiting resolution.
pub struct PotentialToken {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
    /// Ranges resolved recursively into the token's children.
    pub inner: Vec<Span>,
    /// Tokenizer-specific data carried to `parse_token`.
    pub payload: Option<Box<dyn Any + Send>>,
}

impl PotentialToken {
    pub fn new(kind: NodeKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            inner: Vec::new(),
            payload: None,
        }
    }

    #[must_use]
    pub fn with_inner(mut self, inner: Span) -> Self {
        self.inner.push(inner);
        self
    }

    #[must_use]
    pub fn with_payload<T: Any + Send>(mut self, payload: T) -> Self {
        self.payload = Some(Box::new(payload));
        self
    }

    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_ref()?.downcast_ref::<T>()
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

impl fmt::Debug for PotentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PotentialToken")
            .field("kind", &self.kind)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Who produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Index into the inline registry.
    Tokenizer(usize),
    Text,
}

/// A resolved token with its resolved children.
#[derive(Debug)]
pub struct InlineMatch {
    pub token: PotentialToken,
    pub source: TokenSource,
    pub children: Vec<InlineMatch>,
}

/// Per-pass scratch space of one tokenizer.
#[derive(Debug, Default)]
pub struct ScanState {
    pub delimiters: Vec<Delimiter>,
}

/// One free sub-range offered to `eat_delimiters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub start: usize,
    pub end: usize,
    /// Character just before `start`, if any.
    pub preceding: Option<char>,
    /// Character at `end`, if any.
    pub following: Option<char>,
}
