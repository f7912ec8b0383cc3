use crate::parsing::{
    ast::{DELETE, Node, NodeKind},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer, skip_escape},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::{Span, chars::is_whitespace_or_edge},
};

/// GFM strikethrough: `~~deleted~~`.
pub struct Delete {
    priority: i32,
}

impl Default for Delete {
    fn default() -> Self {
        Self { priority: 30 }
    }
}

impl Delete {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for Delete {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[DELETE]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        let mut i = range.start;
        while i < range.end {
            if let Some(next) = skip_escape(ctx, i, range.end) {
                i = next;
                continue;
            }
            if ctx.char_at(i) != Some('~') {
                i += 1;
                continue;
            }
            let start = i;
            while i < range.end && ctx.char_at(i) == Some('~') {
                i += 1;
            }
            if i - start != 2 {
                continue;
            }
            let before = if start == range.start { range.preceding } else { ctx.char_before(start) };
            let after = if i == range.end { range.following } else { ctx.char_at(i) };
            let kind = match (!is_whitespace_or_edge(after), !is_whitespace_or_edge(before)) {
                (true, true) => DelimiterKind::Both,
                (true, false) => DelimiterKind::Opener,
                (false, true) => DelimiterKind::Closer,
                (false, false) => continue,
            };
            state.delimiters.push(Delimiter::new(kind, start, i, '~'));
        }
    }

    fn eat_potential_tokens(
        &self,
        _ctx: &InlineContext<'_>,
        delimiters: Vec<Delimiter>,
        _claimed: &[Span],
    ) -> Vec<PotentialToken> {
        let mut tokens = Vec::new();
        let mut openers: Vec<Delimiter> = Vec::new();
        for delimiter in delimiters {
            if delimiter.kind.can_close()
                && let Some(opener) = openers.pop()
            {
                // Openers above the matched one can no longer pair.
                openers.clear();
                tokens.push(
                    PotentialToken::new(DELETE, opener.start, delimiter.end)
                        .with_inner(Span::new(opener.end, delimiter.start)),
                );
                continue;
            }
            if delimiter.kind.can_open() {
                openers.push(delimiter);
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
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn spans(input: &str) -> Vec<(usize, usize)> {
        let points = code_points(input);
        let meta = BTreeMap::new();
        let ctx = InlineContext::new(&points, &meta, false);
        let delete = Delete::default();
        let mut state = ScanState::default();
        delete.eat_delimiters(
            &ctx,
            ScanRange {
                start: 0,
                end: points.len(),
                preceding: None,
                following: None,
            },
            &mut state,
        );
        delete
            .eat_potential_tokens(&ctx, state.delimiters, &[])
            .iter()
            .map(|t| (t.start, t.end))
            .collect()
    }

    #[rstest]
    #[case("~~a~~", vec![(0, 5)])]
    #[case("x ~~a b~~ y", vec![(2, 9)])]
    #[case("~a~", vec![])]
    #[case("~~~a~~~", vec![])]
    #[case("~~ a ~~", vec![])]
    #[case(r"\~~a~~", vec![])]
    fn strikethrough_runs(#[case] input: &str, #[case] expected: Vec<(usize, usize)>) {
        assert_eq!(spans(input), expected);
    }
}
