use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::{
    options::DEFAULT_MAX_NESTING,
    parsing::{
        ast::{Definition, Node, NodeKind, Position},
        points::{NodePoint, Span, text::{literal, normalize_identifier}},
    },
};

use super::types::{Delimiter, InlineMatch, PotentialToken, ScanRange, ScanState};

/// Read-only view of one phrasing run during inline resolution.
pub struct InlineContext<'a> {
    pub points: &'a [NodePoint],
    pub meta: &'a BTreeMap<String, Definition>,
    pub position: bool,
    /// Deepest token nesting resolved; anything below becomes text.
    pub max_nesting: usize,
    text: OnceLock<(String, Vec<usize>)>,
}

impl<'a> InlineContext<'a> {
    pub fn new(
        points: &'a [NodePoint],
        meta: &'a BTreeMap<String, Definition>,
        position: bool,
    ) -> Self {
        Self {
            points,
            meta,
            position,
            max_nesting: DEFAULT_MAX_NESTING,
            text: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn char_at(&self, index: usize) -> Option<char> {
        self.points.get(index).map(|p| p.code_point)
    }

    /// Character before `index`; `None` at the start of the run.
    pub fn char_before(&self, index: usize) -> Option<char> {
        index.checked_sub(1).and_then(|i| self.char_at(i))
    }

    pub fn literal(&self, span: Span) -> String {
        literal(self.points, span.start, span.end)
    }

    pub fn position_of(&self, span: Span) -> Option<Position> {
        if self.position {
            Position::from_points(self.points, span.start, span.end)
        } else {
            None
        }
    }

    pub fn definition(&self, label: &str) -> Option<&'a Definition> {
        self.meta.get(&normalize_identifier(label))
    }

    fn text(&self) -> &(String, Vec<usize>) {
        self.text.get_or_init(|| {
            let mut text = String::with_capacity(self.points.len());
            let mut offsets = Vec::with_capacity(self.points.len() + 1);
            for p in self.points {
                offsets.push(text.len());
                text.push(p.code_point);
            }
            offsets.push(text.len());
            (text, offsets)
        })
    }

    /// Runs an anchored regex at point `start`, never past `end`; returns
    /// the point index after the match.
    pub fn match_at(&self, regex: &Regex, start: usize, end: usize) -> Option<usize> {
        let (text, offsets) = self.text();
        let from = *offsets.get(start)?;
        let to = *offsets.get(end.min(self.points.len()))?;
        let found = regex.find(text.get(from..to)?)?;
        if found.start() != 0 {
            return None;
        }
        let byte_end = from + found.end();
        offsets.binary_search(&byte_end).ok()
    }
}

/// An inline grammar plugged into the resolution engine.
pub trait InlineTokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Higher runs first. Must be unique.
    fn priority(&self) -> i32;

    fn recognized_types(&self) -> &'static [NodeKind];

    /// Kinds that may not appear anywhere inside this tokenizer's nodes.
    fn forbidden_descendants(&self) -> &'static [NodeKind] {
        &[]
    }

    /// Scans one free range, recording delimiters in `state`.
    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState);

    /// Pairs the delimiters of a whole pass. `claimed` holds the spans
    /// already taken by higher-priority tokens.
    fn eat_potential_tokens(
        &self,
        ctx: &InlineContext<'_>,
        delimiters: Vec<Delimiter>,
        claimed: &[Span],
    ) -> Vec<PotentialToken>;

    /// Final veto once the token's children are resolved.
    fn match_token(
        &self,
        _ctx: &InlineContext<'_>,
        _token: &PotentialToken,
        _children: &[InlineMatch],
    ) -> bool {
        true
    }

    fn parse_token(&self, ctx: &InlineContext<'_>, token: &PotentialToken, children: Vec<Node>) -> Node;
}

/// Produces nodes for the ranges no tokenizer claimed.
pub trait TextTokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn kind(&self) -> NodeKind;

    fn parse_text(&self, ctx: &InlineContext<'_>, span: Span) -> Option<Node>;
}

/// Skips a backslash escape at `i`; returns the index after it.
pub fn skip_escape(ctx: &InlineContext<'_>, i: usize, end: usize) -> Option<usize> {
    (ctx.char_at(i) == Some('\\')
        && i + 1 < end
        && ctx.char_at(i + 1).is_some_and(|c| c.is_ascii_punctuation()))
    .then_some(i + 2)
}
