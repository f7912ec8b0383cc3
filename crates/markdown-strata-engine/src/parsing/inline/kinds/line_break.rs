use crate::parsing::{
    ast::{BREAK, Node, NodeKind},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::Span,
};

/// Hard line breaks: two or more spaces, or a backslash, before a line feed.
pub struct LineBreak {
    priority: i32,
}

impl Default for LineBreak {
    fn default() -> Self {
        Self { priority: 40 }
    }
}

impl LineBreak {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for LineBreak {
    fn name(&self) -> &'static str {
        "line-break"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[BREAK]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        for i in range.start..range.end {
            if ctx.char_at(i) != Some('\n') {
                continue;
            }
            let mut spaces = i;
            while spaces > range.start && ctx.char_at(spaces - 1) == Some(' ') {
                spaces -= 1;
            }
            let mut backslashes = i;
            while backslashes > range.start && ctx.char_at(backslashes - 1) == Some('\\') {
                backslashes -= 1;
            }
            let start = if i - spaces >= 2 {
                spaces
            } else if (i - backslashes) % 2 == 1 {
                i - 1
            } else {
                continue;
            };
            // Indentation of the next line goes with the break.
            let mut end = i + 1;
            while end < range.end && ctx.char_at(end) == Some(' ') {
                end += 1;
            }
            state
                .delimiters
                .push(Delimiter::new(DelimiterKind::Full, start, end, '\n'));
        }
    }

    fn eat_potential_tokens(
        &self,
        _ctx: &InlineContext<'_>,
        delimiters: Vec<Delimiter>,
        _claimed: &[Span],
    ) -> Vec<PotentialToken> {
        delimiters
            .into_iter()
            .map(|d| PotentialToken::new(BREAK, d.start, d.end))
            .collect()
    }

    fn parse_token(&self, _ctx: &InlineContext<'_>, _token: &PotentialToken, _children: Vec<Node>) -> Node {
        Node::new(BREAK)
    }
}
