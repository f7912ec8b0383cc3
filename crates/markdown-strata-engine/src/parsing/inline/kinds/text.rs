use crate::parsing::{
    ast::{Node, NodeKind, TEXT},
    inline::tokenizer::{InlineContext, TextTokenizer},
    points::{Span, text::unescape_and_decode},
};

/// Fallback for every range no tokenizer claimed.
pub struct Text {
    kind: NodeKind,
}

impl Default for Text {
    fn default() -> Self {
        Self { kind: TEXT }
    }
}

impl Text {
    pub fn with_kind(kind: NodeKind) -> Self {
        Self { kind }
    }
}

impl TextTokenizer for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn parse_text(&self, ctx: &InlineContext<'_>, span: Span) -> Option<Node> {
        let value = unescape_and_decode(&strip_soft_break_padding(&ctx.literal(span)));
        (!value.is_empty()).then(|| Node::literal(self.kind, value))
    }
}

/// Drops spaces at the end of a line and at the start of the next one
/// around every soft line break.
fn strip_soft_break_padding(raw: &str) -> String {
    if !raw.contains('\n') {
        return raw.to_string();
    }
    let last = raw.matches('\n').count();
    raw.split('\n')
        .enumerate()
        .map(|(i, line)| {
            let line = if i < last { line.trim_end_matches([' ', '\t']) } else { line };
            if i > 0 { line.trim_start_matches([' ', '\t']) } else { line }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
