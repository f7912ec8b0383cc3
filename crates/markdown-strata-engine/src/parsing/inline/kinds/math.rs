use crate::parsing::{
    ast::{INLINE_MATH, Node, NodeKind},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer, skip_escape},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::Span,
};

use super::code_span::{pair_equal_runs, strip_code_content};

/// Inline math written as `` `$ x^2 $` ``: a backtick run plus `$` opens,
/// `$` plus an equally long backtick run closes.
pub struct InlineMath {
    priority: i32,
}

impl Default for InlineMath {
    fn default() -> Self {
        Self { priority: 100 }
    }
}

impl InlineMath {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for InlineMath {
    fn name(&self) -> &'static str {
        "inline-math"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[INLINE_MATH]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        let run_end = |mut i: usize| {
            while i < range.end && ctx.char_at(i) == Some('`') {
                i += 1;
            }
            i
        };
        let mut i = range.start;
        while i < range.end {
            match ctx.char_at(i) {
                Some('\\') if ctx.char_at(i + 1) != Some('`') => {
                    i = skip_escape(ctx, i, range.end).unwrap_or(i + 1);
                }
                Some('`') => {
                    let end = run_end(i);
                    if end < range.end && ctx.char_at(end) == Some('$') {
                        state
                            .delimiters
                            .push(Delimiter::new(DelimiterKind::Opener, i, end + 1, '$'));
                        i = end + 1;
                    } else {
                        i = end;
                    }
                }
                Some('$') => {
                    let end = run_end(i + 1);
                    if end > i + 1 {
                        state
                            .delimiters
                            .push(Delimiter::new(DelimiterKind::Closer, i, end, '$'));
                    }
                    i = end.max(i + 1);
                }
                _ => i += 1,
            }
        }
    }

    fn eat_potential_tokens(
        &self,
        _ctx: &InlineContext<'_>,
        delimiters: Vec<Delimiter>,
        claimed: &[Span],
    ) -> Vec<PotentialToken> {
        pair_equal_runs(&delimiters, claimed, INLINE_MATH)
    }

    fn parse_token(&self, ctx: &InlineContext<'_>, token: &PotentialToken, _children: Vec<Node>) -> Node {
        // Both delimiters are as long as the opening backticks plus `$`.
        let mut open = token.start;
        while ctx.char_at(open) == Some('`') {
            open += 1;
        }
        let thickness = open + 1 - token.start;
        let raw = ctx.literal(Span::new(open + 1, token.end - thickness));
        Node::literal(INLINE_MATH, strip_code_content(&raw))
    }
}
