use crate::parsing::{
    ast::{DEFINITION, Definition, NodeKind, Position},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer, CloseOutcome,
        ContinuationResult, OpenerContext, OpenerResult, RawChild,
    },
    inline::kinds::destination::{TitleScan, eat_link_destination, eat_link_label, eat_link_title},
    points::{
        Cursor, EatingLine, LineRange, NodePoint, Span,
        text::{literal, normalize_identifier, unescape_and_decode},
    },
};

/// `[label]: destination "title"` definitions, which may span lines.
///
/// Lines are buffered and the whole buffer is rescanned on every new line;
/// the longest valid definition found so far is kept so that a later
/// failure only hands the extra lines back.
pub struct LinkDefinition {
    priority: i32,
}

impl LinkDefinition {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for LinkDefinition {
    fn default() -> Self {
        Self::with_priority(20)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DefinitionParts {
    label: String,
    destination: String,
    title: Option<String>,
    /// Source span of the definition.
    span: Span,
}

#[derive(Debug, PartialEq, Eq)]
enum DefinitionScan {
    /// A definition ending with line `lines`; `open` when a title on the
    /// following line could still extend it.
    Complete {
        parts: DefinitionParts,
        lines: usize,
        open: bool,
    },
    /// Needs more lines to decide.
    Partial,
    Invalid,
}

#[derive(Debug, Default)]
struct DefinitionState {
    lines: Vec<LineRange>,
    best: Option<(DefinitionParts, usize)>,
}

impl DefinitionState {
    fn finish(&mut self) -> ContinuationResult {
        match &self.best {
            Some((_, n)) => {
                let n = *n;
                ContinuationResult::Finished {
                    lines: self.lines.split_off(n),
                }
            }
            None => ContinuationResult::Failed {
                lines: std::mem::take(&mut self.lines),
            },
        }
    }
}

fn buffered(points: &[NodePoint], lines: &[LineRange]) -> Vec<NodePoint> {
    lines
        .iter()
        .flat_map(|r| points[r.start..r.end.min(points.len())].iter().copied())
        .collect()
}

fn line_count(buf: &[NodePoint], upto: usize) -> usize {
    let newlines = buf[..upto].iter().filter(|p| p.code_point == '\n').count();
    newlines + usize::from(upto > 0 && buf[upto - 1].code_point != '\n')
}

fn label_may_continue(buf: &[NodePoint], start: usize) -> bool {
    buf.len() - start < 1000 && !buf[start + 1..].iter().any(|p| matches!(p.code_point, '[' | ']'))
}

fn parts(
    buf: &[NodePoint],
    label: Span,
    destination: Span,
    title: Option<Span>,
    start: usize,
    end: usize,
) -> DefinitionParts {
    let decode = |s: Span| unescape_and_decode(&literal(buf, s.start, s.end));
    DefinitionParts {
        label: literal(buf, label.start, label.end),
        destination: decode(destination),
        title: title.map(decode),
        span: Span::new(buf[start].offset, buf[end - 1].offset + 1),
    }
}

fn scan(buf: &[NodePoint]) -> DefinitionScan {
    let end = buf.len();
    let mut cur = Cursor::new(buf, 0, end);
    cur.eat_spaces();
    let start = cur.pos();
    if cur.peek() != Some('[') {
        return DefinitionScan::Invalid;
    }
    let Some((label, after_label)) = eat_link_label(buf, start, end) else {
        return if label_may_continue(buf, start) {
            DefinitionScan::Partial
        } else {
            DefinitionScan::Invalid
        };
    };
    cur.i = after_label;
    if cur.bump() != Some(':') {
        return DefinitionScan::Invalid;
    }
    cur.eat_optional_whitespace();
    if cur.eof() {
        return DefinitionScan::Partial;
    }
    let Some((destination, after_destination)) = eat_link_destination(buf, cur.pos(), end) else {
        return DefinitionScan::Invalid;
    };
    cur.i = after_destination;
    let spaces = cur.eat_spaces();
    let without_title = parts(buf, label, destination, None, start, after_destination);

    if cur.eof() {
        return DefinitionScan::Complete {
            parts: without_title,
            lines: line_count(buf, end),
            open: true,
        };
    }

    if cur.peek() == Some('\n') {
        cur.bump();
        let destination_lines = line_count(buf, cur.pos());
        cur.eat_spaces();
        if cur.eof() {
            return DefinitionScan::Complete {
                parts: without_title,
                lines: destination_lines,
                open: true,
            };
        }
        return match eat_link_title(buf, cur.pos(), end) {
            TitleScan::Closed(title, after) => {
                cur.i = after;
                cur.eat_spaces();
                if cur.eof() || cur.peek() == Some('\n') {
                    cur.bump();
                    DefinitionScan::Complete {
                        parts: parts(buf, label, destination, Some(title), start, after),
                        lines: line_count(buf, cur.pos()),
                        open: false,
                    }
                } else {
                    DefinitionScan::Complete {
                        parts: without_title,
                        lines: destination_lines,
                        open: false,
                    }
                }
            }
            TitleScan::Unclosed => DefinitionScan::Partial,
            TitleScan::Invalid => DefinitionScan::Complete {
                parts: without_title,
                lines: destination_lines,
                open: false,
            },
        };
    }

    if spaces == 0 {
        return DefinitionScan::Invalid;
    }
    match eat_link_title(buf, cur.pos(), end) {
        TitleScan::Closed(title, after) => {
            cur.i = after;
            cur.eat_spaces();
            if cur.eof() || cur.peek() == Some('\n') {
                cur.bump();
                DefinitionScan::Complete {
                    parts: parts(buf, label, destination, Some(title), start, after),
                    lines: line_count(buf, cur.pos()),
                    open: false,
                }
            } else {
                DefinitionScan::Invalid
            }
        }
        TitleScan::Unclosed => DefinitionScan::Partial,
        TitleScan::Invalid => DefinitionScan::Invalid,
    }
}

impl BlockTokenizer for LinkDefinition {
    fn name(&self) -> &'static str {
        "link-definition"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[DEFINITION]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::CONTINUATION | BlockHooks::CLOSE
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.preceding_space_count() > 3 || line.first_char() != Some('[') {
            return None;
        }
        let range = LineRange {
            start: line.start_index,
            end: line.end_index,
        };
        let best = match scan(&buffered(line.points, &[range])) {
            DefinitionScan::Invalid => return None,
            DefinitionScan::Partial => None,
            DefinitionScan::Complete { parts, .. } => Some((parts, 1)),
        };
        let state = BlockState::new(
            DEFINITION,
            Span::new(line.first_non_whitespace_index, line.trimmed_end()),
            DefinitionState {
                lines: vec![range],
                best,
            },
        );
        Some(OpenerResult {
            next_index: line.end_index,
            state,
        })
    }

    fn eat_continuation_text(
        &self,
        line: &EatingLine<'_>,
        state: &mut BlockState,
    ) -> ContinuationResult {
        let Some(definition) = state.data_mut::<DefinitionState>() else {
            return ContinuationResult::NotMatched;
        };
        if line.is_blank() {
            return definition.finish();
        }
        definition.lines.push(LineRange {
            start: line.start_index,
            end: line.end_index,
        });
        match scan(&buffered(line.points, &definition.lines)) {
            DefinitionScan::Complete { parts, lines, open } if lines == definition.lines.len() => {
                definition.best = Some((parts, lines));
                ContinuationResult::Matched {
                    next_index: line.end_index,
                    saturated: !open,
                }
            }
            DefinitionScan::Complete { parts, lines, .. } => {
                definition.lines.pop();
                definition.best = Some((parts, lines));
                definition.finish()
            }
            DefinitionScan::Partial => ContinuationResult::Matched {
                next_index: line.end_index,
                saturated: false,
            },
            DefinitionScan::Invalid => {
                definition.lines.pop();
                definition.finish()
            }
        }
    }

    fn on_close(&self, state: &mut BlockState) -> CloseOutcome {
        let Some(definition) = state.data_mut::<DefinitionState>() else {
            return CloseOutcome::Keep;
        };
        match &definition.best {
            Some((_, n)) if *n < definition.lines.len() => {
                let n = *n;
                CloseOutcome::KeepAndReinterpret(definition.lines.split_off(n))
            }
            Some(_) => CloseOutcome::Keep,
            None => CloseOutcome::Reinterpret(std::mem::take(&mut definition.lines)),
        }
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let (parts, _) = state.data::<DefinitionState>()?.best.as_ref()?;
        let position = if ctx.position {
            Position::from_points(ctx.points, parts.span.start, parts.span.end)
        } else {
            None
        };
        Some(BlockParsed::Meta(Definition {
            identifier: normalize_identifier(&parts.label),
            label: parts.label.clone(),
            destination: parts.destination.clone(),
            title: parts.title.clone(),
            position,
        }))
    }
}
