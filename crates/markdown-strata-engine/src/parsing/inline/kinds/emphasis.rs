use std::collections::HashMap;

use crate::parsing::{
    ast::{EMPHASIS, Node, NodeKind, STRONG},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer, skip_escape},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::{
        Span,
        chars::{is_punctuation, is_whitespace_or_edge},
    },
};

/// `*emphasis*`, `_emphasis_`, `**strong**` and `__strong__`.
pub struct Emphasis {
    priority: i32,
}

impl Default for Emphasis {
    fn default() -> Self {
        Self { priority: 20 }
    }
}

impl Emphasis {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

/// Flanking classification of a delimiter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Flanking {
    pub left: bool,
    pub right: bool,
}

impl Flanking {
    pub(crate) fn of(before: Option<char>, after: Option<char>) -> Self {
        let punct = |c: Option<char>| c.is_some_and(is_punctuation);
        let left = !is_whitespace_or_edge(after)
            && (!punct(after) || is_whitespace_or_edge(before) || punct(before));
        let right = !is_whitespace_or_edge(before)
            && (!punct(before) || is_whitespace_or_edge(after) || punct(after));
        Self { left, right }
    }
}

fn classify(marker: char, before: Option<char>, after: Option<char>) -> Option<DelimiterKind> {
    let flanking = Flanking::of(before, after);
    let punct = |c: Option<char>| c.is_some_and(is_punctuation);
    let (open, close) = if marker == '_' {
        (
            flanking.left && (!flanking.right || punct(before)),
            flanking.right && (!flanking.left || punct(after)),
        )
    } else {
        (flanking.left, flanking.right)
    };
    match (open, close) {
        (true, true) => Some(DelimiterKind::Both),
        (true, false) => Some(DelimiterKind::Opener),
        (false, true) => Some(DelimiterKind::Closer),
        (false, false) => None,
    }
}

/// Rule of three: when either side can both open and close, the run
/// lengths may not sum to a multiple of three unless both are multiples.
fn violates_rule_of_three(opener: &Delimiter, closer: &Delimiter) -> bool {
    let both = opener.kind == DelimiterKind::Both || closer.kind == DelimiterKind::Both;
    both && (opener.original_thickness + closer.original_thickness) % 3 == 0
        && !(opener.original_thickness % 3 == 0 && closer.original_thickness % 3 == 0)
}

impl InlineTokenizer for Emphasis {
    fn name(&self) -> &'static str {
        "emphasis"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[EMPHASIS, STRONG]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        let mut i = range.start;
        while i < range.end {
            if let Some(next) = skip_escape(ctx, i, range.end) {
                i = next;
                continue;
            }
            let Some(marker @ ('*' | '_')) = ctx.char_at(i) else {
                i += 1;
                continue;
            };
            let start = i;
            while i < range.end && ctx.char_at(i) == Some(marker) {
                i += 1;
            }
            let before = if start == range.start { range.preceding } else { ctx.char_before(start) };
            let after = if i == range.end { range.following } else { ctx.char_at(i) };
            if let Some(kind) = classify(marker, before, after) {
                state.delimiters.push(Delimiter::new(kind, start, i, marker));
            }
        }
    }

    fn eat_potential_tokens(
        &self,
        _ctx: &InlineContext<'_>,
        mut delimiters: Vec<Delimiter>,
        _claimed: &[Span],
    ) -> Vec<PotentialToken> {
        let mut tokens = Vec::new();
        // Lowest index worth searching for an opener, per closer class.
        let mut bottoms: HashMap<(char, bool, usize), usize> = HashMap::new();
        let mut i = 0;
        while i < delimiters.len() {
            let closer = delimiters[i];
            if !closer.kind.can_close() || closer.thickness == 0 {
                i += 1;
                continue;
            }
            let key = (closer.marker, closer.kind.can_open(), closer.original_thickness % 3);
            let bottom = bottoms.get(&key).copied().unwrap_or(0);

            let mut found = None;
            let mut j = i;
            while j > bottom {
                j -= 1;
                let opener = &delimiters[j];
                if opener.marker != closer.marker
                    || opener.thickness == 0
                    || !opener.kind.can_open()
                    || violates_rule_of_three(opener, &closer)
                {
                    continue;
                }
                found = Some(j);
                break;
            }

            let Some(j) = found else {
                bottoms.insert(key, i);
                i += 1;
                continue;
            };

            let n = if delimiters[j].thickness >= 2 && closer.thickness >= 2 { 2 } else { 1 };
            // Openers give up their rightmost markers, closers their leftmost.
            let inner_start = delimiters[j].start + delimiters[j].thickness;
            let inner_end = closer.end - closer.thickness;
            tokens.push(
                PotentialToken::new(if n == 2 { STRONG } else { EMPHASIS }, inner_start - n, inner_end + n)
                    .with_inner(Span::new(inner_start, inner_end)),
            );
            delimiters[j].thickness -= n;
            delimiters[i].thickness -= n;
            for between in &mut delimiters[j + 1..i] {
                between.thickness = 0;
            }
            if delimiters[i].thickness == 0 {
                i += 1;
            }
        }
        tokens
    }

    fn parse_token(&self, _ctx: &InlineContext<'_>, token: &PotentialToken, children: Vec<Node>) -> Node {
        Node::parent(token.kind, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::code_points;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn tokens(input: &str) -> Vec<(NodeKind, usize, usize)> {
        let points = code_points(input);
        let meta = BTreeMap::new();
        let ctx = InlineContext::new(&points, &meta, false);
        let emphasis = Emphasis::default();
        let mut state = ScanState::default();
        emphasis.eat_delimiters(
            &ctx,
            ScanRange {
                start: 0,
                end: points.len(),
                preceding: None,
                following: None,
            },
            &mut state,
        );
        let mut found: Vec<_> = emphasis
            .eat_potential_tokens(&ctx, state.delimiters, &[])
            .into_iter()
            .map(|t| (t.kind, t.start, t.end))
            .collect();
        found.sort_by_key(|&(_, s, e)| (s, e));
        found
    }

    #[test]
    fn single_emphasis() {
        assert_eq!(tokens("*a*"), vec![(EMPHASIS, 0, 3)]);
    }

    #[test]
    fn triple_run_nests_strong_inside_emphasis() {
        assert_eq!(tokens("***a***"), vec![(EMPHASIS, 0, 7), (STRONG, 1, 6)]);
    }

    #[test]
    fn rule_of_three_blocks_inner_pair() {
        // `*foo**bar*`: the middle run both opens and closes.
        assert_eq!(tokens("*foo**bar*"), vec![(EMPHASIS, 0, 10)]);
    }

    #[rstest]
    #[case("a * b *")]
    #[case("foo_bar_")]
    #[case("**a*")]
    fn no_full_match(#[case] input: &str) {
        let found = tokens(input);
        assert!(found.iter().all(|&(_, s, e)| !(s == 0 && e == input.len())));
    }

    #[test]
    fn underscore_inside_words_is_literal() {
        assert_eq!(tokens("snake_case_name"), vec![]);
    }

    #[test]
    fn unbalanced_opener_keeps_leftover() {
        assert_eq!(tokens("**a*"), vec![(EMPHASIS, 1, 4)]);
    }

    #[test]
    fn flanking_classes() {
        assert_eq!(Flanking::of(None, Some('a')), Flanking { left: true, right: false });
        assert_eq!(Flanking::of(Some('a'), None), Flanking { left: false, right: true });
        assert_eq!(Flanking::of(Some('a'), Some('b')), Flanking { left: true, right: true });
        assert_eq!(Flanking::of(Some(' '), Some(' ')), Flanking { left: false, right: false });
    }
}
