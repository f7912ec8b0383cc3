//! Resolution of one phrasing run into nested inline nodes.

use std::collections::BTreeMap;

use crate::parsing::{
    ast::{Node, NodeKind},
    points::Span,
    registry::{InlineRegistry, Phases},
};

use super::{
    tokenizer::InlineContext,
    types::{InlineMatch, PotentialToken, ScanRange, ScanState, TokenSource},
};

/// Resolves the whole run of `ctx` and parses the result into nodes.
pub fn resolve(registry: &InlineRegistry, ctx: &InlineContext<'_>) -> Vec<Node> {
    let matches = resolve_range(registry, ctx, Span::new(0, ctx.len()), &[]);
    parse_matches(registry, ctx, matches)
}

struct Accepted {
    token: PotentialToken,
    index: usize,
}

/// Outermost spans accepted so far on one level, keyed by start.
///
/// Accepted spans never cross and never sit inside an earlier claim, so
/// the outermost ones are disjoint and decide every later check.
#[derive(Debug, Default)]
struct Claims {
    spans: BTreeMap<usize, usize>,
}

impl Claims {
    /// True when `span` crosses a claim or lies inside one.
    fn blocks(&self, span: Span) -> bool {
        if let Some((&start, &end)) = self.spans.range(..=span.start).next_back()
            && end > span.start
            && (start < span.start || end >= span.end)
        {
            return true;
        }
        self.spans
            .range(span.start + 1..span.end)
            .next_back()
            .is_some_and(|(_, &end)| end > span.end)
    }

    /// Records `span`, dropping the claims it encloses.
    fn insert(&mut self, span: Span) {
        let enclosed: Vec<usize> = self.spans.range(span.start..span.end).map(|(&s, _)| s).collect();
        for start in enclosed {
            self.spans.remove(&start);
        }
        self.spans.insert(span.start, span.end);
    }

    fn to_vec(&self) -> Vec<Span> {
        self.spans.iter().map(|(&start, &end)| Span::new(start, end)).collect()
    }
}

/// Match phase over `range`: every tokenizer scans what higher-priority
/// tokenizers left free, then the accepted tokens are swept into a
/// non-overlapping sequence and their inner ranges resolved recursively.
///
/// Tokens nested deeper than `ctx.max_nesting` are left as text.
pub fn resolve_range(
    registry: &InlineRegistry,
    ctx: &InlineContext<'_>,
    range: Span,
    forbidden: &[NodeKind],
) -> Vec<InlineMatch> {
    resolve_level(registry, ctx, range, forbidden, 0)
}

fn resolve_level(
    registry: &InlineRegistry,
    ctx: &InlineContext<'_>,
    range: Span,
    forbidden: &[NodeKind],
    depth: usize,
) -> Vec<InlineMatch> {
    if range.is_empty() {
        return Vec::new();
    }
    if depth >= ctx.max_nesting {
        log::debug!("inline nesting limit {} reached at {range:?}", ctx.max_nesting);
        return vec![text_match(range.start, range.end)];
    }

    let mut claims = Claims::default();
    let mut accepted: Vec<Accepted> = Vec::new();

    for (index, entry) in registry.entries().iter().enumerate() {
        let tokenizer = entry.tokenizer.as_ref();
        if !entry.phases.contains(Phases::MATCH)
            || tokenizer.recognized_types().iter().all(|k| forbidden.contains(k))
        {
            continue;
        }

        let claimed = claims.to_vec();
        let mut state = ScanState::default();
        for free in free_ranges(range, &claimed) {
            tokenizer.eat_delimiters(
                ctx,
                ScanRange {
                    start: free.start,
                    end: free.end,
                    preceding: ctx.char_before(free.start),
                    following: ctx.char_at(free.end),
                },
                &mut state,
            );
        }
        if state.delimiters.is_empty() {
            continue;
        }

        let tokens = tokenizer.eat_potential_tokens(ctx, std::mem::take(&mut state.delimiters), &claimed);
        log::trace!("{}: {} potential tokens in {range:?}", tokenizer.name(), tokens.len());
        for token in tokens {
            let span = token.span();
            if span.is_empty()
                || !range.contains(span)
                || forbidden.contains(&token.kind)
                || claims.blocks(span)
            {
                continue;
            }
            claims.insert(span);
            accepted.push(Accepted { token, index });
        }
    }

    let kept = sweep(accepted);
    let mut out = Vec::with_capacity(kept.len() * 2 + 1);
    let mut cursor = range.start;
    for Accepted { token, index } in kept {
        if cursor < token.start {
            out.push(text_match(cursor, token.start));
        }
        cursor = token.end;
        let Some(entry) = registry.get(index) else {
            out.push(text_match(token.start, token.end));
            continue;
        };
        let tokenizer = entry.tokenizer.as_ref();

        let mut nested_forbidden = forbidden.to_vec();
        nested_forbidden.extend_from_slice(tokenizer.forbidden_descendants());
        let children: Vec<InlineMatch> = token
            .inner
            .iter()
            .filter(|inner| token.span().contains(**inner))
            .flat_map(|&inner| resolve_level(registry, ctx, inner, &nested_forbidden, depth + 1))
            .collect();

        if tokenizer.match_token(ctx, &token, &children) {
            out.push(InlineMatch {
                token,
                source: TokenSource::Tokenizer(index),
                children,
            });
        } else {
            out.push(text_match(token.start, token.end));
        }
    }
    if cursor < range.end {
        out.push(text_match(cursor, range.end));
    }
    out
}

/// `range` minus the union of `claimed`.
fn free_ranges(range: Span, claimed: &[Span]) -> Vec<Span> {
    let mut taken: Vec<Span> = claimed.to_vec();
    taken.sort();
    let mut free = Vec::new();
    let mut cursor = range.start;
    for span in taken {
        if span.start > cursor {
            free.push(Span::new(cursor, span.start.min(range.end)));
        }
        cursor = cursor.max(span.end);
    }
    if cursor < range.end {
        free.push(Span::new(cursor, range.end));
    }
    free.retain(|s| !s.is_empty());
    free
}

/// Orders accepted tokens by `(start, end)` and keeps a non-overlapping
/// sequence. Nested tokens are dropped here and rediscovered when the
/// enclosing token's inner ranges are resolved.
fn sweep(mut accepted: Vec<Accepted>) -> Vec<Accepted> {
    accepted.sort_by_key(|a| (a.token.start, a.token.end));
    let mut kept: Vec<Accepted> = Vec::with_capacity(accepted.len());
    for candidate in accepted {
        let Some(last) = kept.last() else {
            kept.push(candidate);
            continue;
        };
        let (span, last_span) = (candidate.token.span(), last.token.span());
        if span.start >= last_span.end {
            kept.push(candidate);
        } else if span.start == last_span.start || (span.crosses(last_span) && candidate.index < last.index) {
            // Registry order is priority order: a lower index wins.
            kept.pop();
            kept.push(candidate);
        }
    }
    kept
}

fn text_match(start: usize, end: usize) -> InlineMatch {
    InlineMatch {
        token: PotentialToken::new("", start, end),
        source: TokenSource::Text,
        children: Vec::new(),
    }
}

/// Parse phase: turns matches into nodes, splicing the children of
/// tokenizers whose parse phase is disabled and merging adjacent text.
pub fn parse_matches(registry: &InlineRegistry, ctx: &InlineContext<'_>, matches: Vec<InlineMatch>) -> Vec<Node> {
    let text = registry.text();
    let mut nodes: Vec<Node> = Vec::with_capacity(matches.len());
    for InlineMatch {
        token,
        source,
        children,
    } in matches
    {
        let span = token.span();
        match source {
            TokenSource::Text => {
                if let Some(node) = text.parse_text(ctx, span) {
                    nodes.push(node.with_position(ctx.position_of(span)));
                }
            }
            TokenSource::Tokenizer(index) => {
                let children = parse_matches(registry, ctx, children);
                match registry.get(index) {
                    Some(entry) if entry.phases.contains(Phases::PARSE) => {
                        let node = entry.tokenizer.parse_token(ctx, &token, children);
                        nodes.push(node.with_position(ctx.position_of(span)));
                    }
                    _ => nodes.extend(children),
                }
            }
        }
    }
    merge_text(nodes, text.kind())
}

fn merge_text(nodes: Vec<Node>, kind: NodeKind) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Some(last) = out.last_mut()
            && last.kind == kind
            && node.kind == kind
            && let (Some(value), Some(extra)) = (last.value.as_mut(), node.value.as_deref())
        {
            value.push_str(extra);
            if let (Some(position), Some(next)) = (last.position.as_mut(), node.position) {
                position.end = next.end;
            }
            continue;
        }
        out.push(node);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{
        ast::{Definition, EMPHASIS, INLINE_CODE, LINK, STRONG, TEXT},
        inline::{
            InlineTokenizer,
            kinds::{Emphasis, InlineCode, Link, Text},
        },
        points::code_points,
        registry::Registered,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn entry(tokenizer: impl InlineTokenizer + 'static, phases: Phases) -> Registered<dyn InlineTokenizer> {
        Registered {
            tokenizer: Box::new(tokenizer),
            phases,
        }
    }

    fn registry(entries: Vec<Registered<dyn InlineTokenizer>>) -> InlineRegistry {
        InlineRegistry::new(entries, Box::new(Text::default())).unwrap()
    }

    fn default_registry() -> InlineRegistry {
        registry(vec![
            entry(InlineCode::default(), Phases::all()),
            entry(Link::default(), Phases::all()),
            entry(Emphasis::default(), Phases::all()),
        ])
    }

    /// Compact `kind(children)` / `kind:"value"` rendering.
    fn shape(nodes: &[Node]) -> String {
        nodes
            .iter()
            .map(|n| match &n.value {
                Some(v) => format!("{}:{v:?}", n.kind),
                None => format!("{}({})", n.kind, shape(&n.children)),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn run(registry: &InlineRegistry, input: &str) -> Vec<Node> {
        let points = code_points(input);
        let meta: BTreeMap<String, Definition> = BTreeMap::new();
        let ctx = InlineContext::new(&points, &meta, true);
        resolve(registry, &ctx)
    }

    #[test]
    fn triple_delimiters_nest() {
        let nodes = run(&default_registry(), "***a***");
        assert_eq!(shape(&nodes), r#"emphasis(strong(text:"a"))"#);
        assert_eq!(nodes[0].kind, EMPHASIS);
        assert_eq!(nodes[0].children[0].kind, STRONG);
    }

    #[test]
    fn code_span_shields_delimiters() {
        let nodes = run(&default_registry(), "*a `*` b*");
        assert_eq!(
            shape(&nodes),
            r#"emphasis(text:"a " inlineCode:"*" text:" b")"#
        );
    }

    #[test]
    fn emphasis_cannot_cross_a_code_span() {
        let nodes = run(&default_registry(), "*a `b* c`");
        assert_eq!(shape(&nodes), r#"text:"*a " inlineCode:"b* c""#);
        assert_eq!(nodes[1].kind, INLINE_CODE);
    }

    #[test]
    fn emphasis_inside_link_text() {
        let nodes = run(&default_registry(), "[*a*](/u)");
        assert_eq!(shape(&nodes), r#"link(emphasis(text:"a"))"#);
        assert_eq!(nodes[0].kind, LINK);
    }

    #[test]
    fn emphasis_does_not_escape_link_text() {
        let nodes = run(&default_registry(), "*[a*](/u)");
        assert_eq!(shape(&nodes), r#"text:"*" link(text:"a*")"#);
    }

    #[test]
    fn text_positions_follow_points() {
        let nodes = run(&default_registry(), "ab *c*");
        let text = &nodes[0];
        assert_eq!(text.kind, TEXT);
        let position = text.position.unwrap();
        assert_eq!((position.start.offset, position.end.offset), (0, 3));
        let emphasis = nodes[1].position.unwrap();
        assert_eq!((emphasis.start.column, emphasis.end.column), (4, 7));
    }

    #[test]
    fn disabled_parse_phase_splices_children() {
        let registry = registry(vec![entry(Emphasis::default(), Phases::MATCH)]);
        let nodes = run(&registry, "x *y* z");
        assert_eq!(shape(&nodes), r#"text:"x y z""#);
    }

    #[test]
    fn disabled_match_phase_finds_nothing() {
        let registry = registry(vec![entry(Emphasis::default(), Phases::PARSE)]);
        let nodes = run(&registry, "*y*");
        assert_eq!(shape(&nodes), r#"text:"*y*""#);
    }

    #[test]
    fn nesting_limit_leaves_deeper_tokens_as_text() {
        let points = code_points("**a *b* c**");
        let meta: BTreeMap<String, Definition> = BTreeMap::new();
        let ctx = InlineContext::new(&points, &meta, true).with_max_nesting(1);
        let nodes = resolve(&default_registry(), &ctx);
        assert_eq!(shape(&nodes), r#"strong(text:"a *b* c")"#);
    }

    #[test]
    fn zero_nesting_keeps_everything_as_text() {
        let points = code_points("*a* `b`");
        let meta: BTreeMap<String, Definition> = BTreeMap::new();
        let ctx = InlineContext::new(&points, &meta, true).with_max_nesting(0);
        let nodes = resolve(&default_registry(), &ctx);
        assert_eq!(shape(&nodes), r#"text:"*a* `b`""#);
    }

    #[test]
    fn claims_reject_crossing_and_enclosed_spans() {
        let mut claims = Claims::default();
        claims.insert(Span::new(2, 4));
        claims.insert(Span::new(6, 8));
        assert!(claims.blocks(Span::new(3, 5)));
        assert!(claims.blocks(Span::new(1, 3)));
        assert!(claims.blocks(Span::new(2, 4)));
        assert!(claims.blocks(Span::new(6, 7)));
        assert!(!claims.blocks(Span::new(2, 5)));
        assert!(!claims.blocks(Span::new(0, 10)));
        assert!(!claims.blocks(Span::new(4, 6)));

        claims.insert(Span::new(0, 10));
        assert_eq!(claims.to_vec(), vec![Span::new(0, 10)]);
        assert!(claims.blocks(Span::new(4, 6)));
    }

    #[test]
    fn free_ranges_skip_union_of_claims() {
        let free = free_ranges(
            Span::new(0, 10),
            &[Span::new(2, 4), Span::new(3, 6), Span::new(8, 10)],
        );
        assert_eq!(free, vec![Span::new(0, 2), Span::new(6, 8)]);
    }
}
