use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::{
    ast::{LINK, Node, NodeData, NodeKind, TEXT},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer, skip_escape},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::Span,
};

/// Token kind of `<scheme:...>` and `<user@host>` links. The node they
/// produce is an ordinary `link`.
pub const AUTOLINK: NodeKind = "autolink";

static URI_AUTOLINK: OnceLock<Regex> = OnceLock::new();
static EMAIL_AUTOLINK: OnceLock<Regex> = OnceLock::new();

fn uri_regex() -> &'static Regex {
    URI_AUTOLINK.get_or_init(|| {
        Regex::new(r"^<[A-Za-z][A-Za-z0-9+.\-]{1,31}:[^<>\x00-\x20\x7F]*>")
            .expect("Invalid URI autolink regex")
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_AUTOLINK.get_or_init(|| {
        Regex::new(
            r"^<[A-Za-z0-9.!#$%&'*+/=?^_`{|}~\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]{0,61}[A-Za-z0-9])?)*>",
        )
        .expect("Invalid email autolink regex")
    })
}

pub struct Autolink {
    priority: i32,
}

impl Default for Autolink {
    fn default() -> Self {
        Self { priority: 90 }
    }
}

impl Autolink {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for Autolink {
    fn name(&self) -> &'static str {
        "autolink"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[AUTOLINK]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        let mut i = range.start;
        while i < range.end {
            if let Some(next) = skip_escape(ctx, i, range.end) {
                i = next;
                continue;
            }
            if ctx.char_at(i) != Some('<') {
                i += 1;
                continue;
            }
            if let Some(end) = ctx.match_at(uri_regex(), i, range.end) {
                state
                    .delimiters
                    .push(Delimiter::new(DelimiterKind::Full, i, end, ':'));
                i = end;
            } else if let Some(end) = ctx.match_at(email_regex(), i, range.end) {
                state
                    .delimiters
                    .push(Delimiter::new(DelimiterKind::Full, i, end, '@'));
                i = end;
            } else {
                i += 1;
            }
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
            .map(|d| PotentialToken::new(AUTOLINK, d.start, d.end).with_payload(d.marker == '@'))
            .collect()
    }

    fn parse_token(&self, ctx: &InlineContext<'_>, token: &PotentialToken, _children: Vec<Node>) -> Node {
        let content = Span::new(token.start + 1, token.end - 1);
        let text = ctx.literal(content);
        let url = if token.payload::<bool>().copied().unwrap_or(false) {
            format!("mailto:{text}")
        } else {
            text.clone()
        };
        let child = Node::literal(TEXT, text).with_position(ctx.position_of(content));
        Node::parent(LINK, vec![child]).with_data(NodeData::Link { url, title: None })
    }
}
