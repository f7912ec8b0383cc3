use crate::parsing::{
    ast::{INLINE_CODE, Node, NodeKind},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::Span,
};

/// `` `code` `` spans. Claims its span before most other inline grammars.
pub struct InlineCode {
    priority: i32,
}

impl Default for InlineCode {
    fn default() -> Self {
        Self { priority: 95 }
    }
}

impl InlineCode {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

/// Pairs delimiters of equal thickness left to right, never across a
/// claimed span. Openers without a closer become literal text.
pub(crate) fn pair_equal_runs(
    delimiters: &[Delimiter],
    claimed: &[Span],
    kind: NodeKind,
) -> Vec<PotentialToken> {
    let mut tokens = Vec::new();
    let mut resume_at = 0;
    for (i, opener) in delimiters.iter().enumerate() {
        if !opener.kind.can_open() || opener.start < resume_at {
            continue;
        }
        let closer = delimiters[i + 1..]
            .iter()
            .filter(|c| c.start >= opener.end)
            .take_while(|c| !claimed.iter().any(|s| s.intersects(Span::new(opener.end, c.start))))
            .find(|c| c.kind.can_close() && c.thickness == opener.thickness);
        if let Some(closer) = closer {
            tokens.push(PotentialToken::new(kind, opener.start, closer.end));
            resume_at = closer.end;
        }
    }
    tokens
}

/// Content between the delimiters: line feeds become spaces, and one space
/// is stripped from each side when both sides have one and the content is
/// not only spaces.
pub(crate) fn strip_code_content(raw: &str) -> String {
    let value = raw.replace('\n', " ");
    if value.len() >= 2
        && value.starts_with(' ')
        && value.ends_with(' ')
        && value.chars().any(|c| c != ' ')
    {
        value[1..value.len() - 1].to_string()
    } else {
        value
    }
}

impl InlineTokenizer for InlineCode {
    fn name(&self) -> &'static str {
        "inline-code"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[INLINE_CODE]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        let mut i = range.start;
        while i < range.end {
            match ctx.char_at(i) {
                Some('\\') if ctx.char_at(i + 1) == Some('`') && i + 1 < range.end => {
                    // The escaped backtick may still close a span, since
                    // escapes are inert inside code, but cannot open one.
                    let start = i + 1;
                    let mut end = start;
                    while end < range.end && ctx.char_at(end) == Some('`') {
                        end += 1;
                    }
                    state
                        .delimiters
                        .push(Delimiter::new(DelimiterKind::Closer, start, end, '`'));
                    if end > start + 1 {
                        state
                            .delimiters
                            .push(Delimiter::new(DelimiterKind::Opener, start + 1, end, '`'));
                    }
                    i = end;
                }
                Some('`') => {
                    let start = i;
                    while i < range.end && ctx.char_at(i) == Some('`') {
                        i += 1;
                    }
                    state
                        .delimiters
                        .push(Delimiter::new(DelimiterKind::Both, start, i, '`'));
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
        pair_equal_runs(&delimiters, claimed, INLINE_CODE)
    }

    fn parse_token(&self, ctx: &InlineContext<'_>, token: &PotentialToken, _children: Vec<Node>) -> Node {
        let mut open = token.start;
        while ctx.char_at(open) == Some('`') {
            open += 1;
        }
        let thickness = open - token.start;
        let raw = ctx.literal(Span::new(open, token.end - thickness));
        Node::literal(INLINE_CODE, strip_code_content(&raw))
    }
}
