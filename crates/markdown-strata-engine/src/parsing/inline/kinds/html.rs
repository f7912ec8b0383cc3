use std::sync::OnceLock;

use regex::Regex;

use crate::parsing::{
    ast::{HTML, Node, NodeKind},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer, skip_escape},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::Span,
};

static RAW_HTML: OnceLock<Regex> = OnceLock::new();

fn raw_html_regex() -> &'static Regex {
    RAW_HTML.get_or_init(|| {
        let tag_name = r"[A-Za-z][A-Za-z0-9\-]*";
        let attribute = r#"(?:\s+[A-Za-z_:][A-Za-z0-9_.:\-]*(?:\s*=\s*(?:[^"'=<>`\x00-\x20]+|'[^']*'|"[^"]*"))?)"#;
        let open_tag = format!(r"<{tag_name}{attribute}*\s*/?>");
        let closing_tag = format!(r"</{tag_name}\s*>");
        let comment = r"<!---?>|<!--[\s\S]*?-->";
        let instruction = r"<\?[\s\S]*?\?>";
        let declaration = r"<![A-Za-z][^>]*>";
        let cdata = r"<!\[CDATA\[[\s\S]*?\]\]>";
        Regex::new(&format!(
            "^(?:{open_tag}|{closing_tag}|{comment}|{instruction}|{declaration}|{cdata})"
        ))
        .expect("Invalid raw HTML regex")
    })
}

/// Raw inline HTML: tags, comments, processing instructions, declarations
/// and CDATA sections, kept verbatim.
pub struct InlineHtml {
    priority: i32,
}

impl Default for InlineHtml {
    fn default() -> Self {
        Self { priority: 85 }
    }
}

impl InlineHtml {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for InlineHtml {
    fn name(&self) -> &'static str {
        "inline-html"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[HTML]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        let mut i = range.start;
        while i < range.end {
            if let Some(next) = skip_escape(ctx, i, range.end) {
                i = next;
                continue;
            }
            if ctx.char_at(i) == Some('<')
                && let Some(end) = ctx.match_at(raw_html_regex(), i, range.end)
            {
                state
                    .delimiters
                    .push(Delimiter::new(DelimiterKind::Full, i, end, '<'));
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
            .map(|d| PotentialToken::new(HTML, d.start, d.end))
            .collect()
    }

    fn parse_token(&self, ctx: &InlineContext<'_>, token: &PotentialToken, _children: Vec<Node>) -> Node {
        Node::literal(HTML, ctx.literal(token.span()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::code_points;
    use rstest::rstest;
    use std::collections::BTreeMap;

    #[rstest]
    #[case("<a>", Some(3))]
    #[case("<a href=\"x\" data-y=z />", Some(23))]
    #[case("</em >", Some(6))]
    #[case("<!-- note -->", Some(13))]
    #[case("<?php echo 1; ?>", Some(16))]
    #[case("<!DOCTYPE html>", Some(15))]
    #[case("<![CDATA[x]]>", Some(13))]
    #[case("<33>", None)]
    #[case("<a h=\"x>", None)]
    #[case("< a>", None)]
    fn raw_html(#[case] input: &str, #[case] expected: Option<usize>) {
        let points = code_points(input);
        let meta = BTreeMap::new();
        let ctx = InlineContext::new(&points, &meta, false);
        assert_eq!(ctx.match_at(raw_html_regex(), 0, points.len()), expected);
    }
}
