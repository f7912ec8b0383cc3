//! Links and images. Both grammars share one bracket-matching pass; each
//! tokenizer keeps only the tokens of its own kind, so an image found while
//! matching links still deactivates the right openers.

use crate::parsing::{
    ast::{IMAGE, IMAGE_REFERENCE, LINK, LINK_REFERENCE, Node, NodeData, NodeKind, ReferenceType},
    inline::{
        tokenizer::{InlineContext, InlineTokenizer, skip_escape},
        types::{Delimiter, DelimiterKind, PotentialToken, ScanRange, ScanState},
    },
    points::{Span, text::unescape_and_decode},
};

use super::{
    autolink::AUTOLINK,
    destination::{eat_inline_link_tail, eat_link_label},
};

const MAX_LABEL_LEN: usize = 999;

/// What a resolved bracket pair points at.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Inline {
        url: String,
        title: Option<String>,
    },
    Reference {
        identifier: String,
        label: String,
        reference_type: ReferenceType,
    },
}

fn scan_brackets(ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
    let mut i = range.start;
    while i < range.end {
        if let Some(next) = skip_escape(ctx, i, range.end) {
            i = next;
            continue;
        }
        match ctx.char_at(i) {
            Some('!') if i + 1 < range.end && ctx.char_at(i + 1) == Some('[') => {
                state
                    .delimiters
                    .push(Delimiter::new(DelimiterKind::Opener, i, i + 2, '!'));
                i += 2;
            }
            Some('[') => {
                state
                    .delimiters
                    .push(Delimiter::new(DelimiterKind::Opener, i, i + 1, '['));
                i += 1;
            }
            Some(']') => {
                state
                    .delimiters
                    .push(Delimiter::new(DelimiterKind::Closer, i, i + 1, ']'));
                i += 1;
            }
            _ => i += 1,
        }
    }
}

/// Label text usable for a collapsed or shortcut reference.
fn text_label(ctx: &InlineContext<'_>, text: Span) -> Option<String> {
    let label = ctx.literal(text);
    (text.len() <= MAX_LABEL_LEN && label.chars().any(|c| !c.is_whitespace())).then_some(label)
}

/// Resolves what follows the `]` at `after - 1`; returns the target and the
/// index after the whole construct.
fn resolve_tail(ctx: &InlineContext<'_>, text: Span, after: usize) -> Option<(Target, usize)> {
    let end = ctx.len();
    if ctx.char_at(after) == Some('(')
        && let Some(tail) = eat_inline_link_tail(ctx.points, after, end)
    {
        let decode = |s: Span| unescape_and_decode(&ctx.literal(s));
        let target = Target::Inline {
            url: tail.destination.map(decode).unwrap_or_default(),
            title: tail.title.map(decode),
        };
        return Some((target, tail.end));
    }

    let (label, reference_type, next) = match eat_link_label(ctx.points, after, end) {
        Some((label, next)) => (ctx.literal(label), ReferenceType::Full, next),
        None if ctx.char_at(after) == Some('[') && ctx.char_at(after + 1) == Some(']') => {
            (text_label(ctx, text)?, ReferenceType::Collapsed, after + 2)
        }
        None => (text_label(ctx, text)?, ReferenceType::Shortcut, after),
    };
    let definition = ctx.definition(&label)?;
    Some((
        Target::Reference {
            identifier: definition.identifier.clone(),
            label,
            reference_type,
        },
        next,
    ))
}

#[derive(Debug)]
struct Opener {
    start: usize,
    end: usize,
    image: bool,
    active: bool,
}

/// Bracket matching: a `]` pairs with the nearest opener; a resolved link
/// deactivates every earlier link opener, since links cannot nest.
fn pair_brackets(
    ctx: &InlineContext<'_>,
    delimiters: Vec<Delimiter>,
    claimed: &[Span],
    want_image: bool,
) -> Vec<PotentialToken> {
    let mut tokens = Vec::new();
    let mut openers: Vec<Opener> = Vec::new();
    let mut resume_at = 0;
    for delimiter in delimiters {
        if delimiter.start < resume_at {
            continue;
        }
        if delimiter.kind == DelimiterKind::Opener {
            openers.push(Opener {
                start: delimiter.start,
                end: delimiter.end,
                image: delimiter.marker == '!',
                active: true,
            });
            continue;
        }
        let Some(opener) = openers.pop() else {
            continue;
        };
        if !opener.active {
            continue;
        }
        let text = Span::new(opener.end, delimiter.start);
        let Some((target, end)) = resolve_tail(ctx, text, delimiter.end) else {
            continue;
        };
        let span = Span::new(opener.start, end);
        if claimed.iter().any(|c| c.crosses(span)) {
            continue;
        }
        if !opener.image {
            openers.iter_mut().filter(|o| !o.image).for_each(|o| o.active = false);
        }
        resume_at = end;
        if opener.image == want_image {
            let kind = match (&target, opener.image) {
                (Target::Inline { .. }, false) => LINK,
                (Target::Reference { .. }, false) => LINK_REFERENCE,
                (Target::Inline { .. }, true) => IMAGE,
                (Target::Reference { .. }, true) => IMAGE_REFERENCE,
            };
            tokens.push(
                PotentialToken::new(kind, span.start, span.end)
                    .with_inner(text)
                    .with_payload(target),
            );
        }
    }
    tokens
}

/// `[text](destination "title")` and `[text][label]` style links.
pub struct Link {
    priority: i32,
}

impl Default for Link {
    fn default() -> Self {
        Self { priority: 60 }
    }
}

impl Link {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for Link {
    fn name(&self) -> &'static str {
        "link"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[LINK, LINK_REFERENCE]
    }

    fn forbidden_descendants(&self) -> &'static [NodeKind] {
        &[LINK, LINK_REFERENCE, AUTOLINK]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        scan_brackets(ctx, range, state);
    }

    fn eat_potential_tokens(
        &self,
        ctx: &InlineContext<'_>,
        delimiters: Vec<Delimiter>,
        claimed: &[Span],
    ) -> Vec<PotentialToken> {
        pair_brackets(ctx, delimiters, claimed, false)
    }

    fn parse_token(&self, _ctx: &InlineContext<'_>, token: &PotentialToken, children: Vec<Node>) -> Node {
        let data = match token.payload::<Target>() {
            Some(Target::Inline { url, title }) => NodeData::Link {
                url: url.clone(),
                title: title.clone(),
            },
            Some(Target::Reference {
                identifier,
                label,
                reference_type,
            }) => NodeData::Reference {
                identifier: identifier.clone(),
                label: label.clone(),
                reference_type: *reference_type,
            },
            None => NodeData::None,
        };
        Node::parent(token.kind, children).with_data(data)
    }
}

/// `![alt](destination "title")` and `![alt][label]` style images.
pub struct Image {
    priority: i32,
}

impl Default for Image {
    fn default() -> Self {
        Self { priority: 70 }
    }
}

impl Image {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl InlineTokenizer for Image {
    fn name(&self) -> &'static str {
        "image"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[IMAGE, IMAGE_REFERENCE]
    }

    fn eat_delimiters(&self, ctx: &InlineContext<'_>, range: ScanRange, state: &mut ScanState) {
        scan_brackets(ctx, range, state);
    }

    fn eat_potential_tokens(
        &self,
        ctx: &InlineContext<'_>,
        delimiters: Vec<Delimiter>,
        claimed: &[Span],
    ) -> Vec<PotentialToken> {
        pair_brackets(ctx, delimiters, claimed, true)
    }

    /// Images keep no children: the resolved description becomes `alt`.
    fn parse_token(&self, _ctx: &InlineContext<'_>, token: &PotentialToken, children: Vec<Node>) -> Node {
        let alt: String = children.iter().map(Node::text_content).collect();
        let data = match token.payload::<Target>() {
            Some(Target::Inline { url, title }) => NodeData::Image {
                url: url.clone(),
                title: title.clone(),
                alt,
            },
            Some(Target::Reference {
                identifier,
                label,
                reference_type,
            }) => NodeData::ImageReference {
                identifier: identifier.clone(),
                label: label.clone(),
                reference_type: *reference_type,
                alt,
            },
            None => NodeData::None,
        };
        Node::new(token.kind).with_data(data)
    }
}
