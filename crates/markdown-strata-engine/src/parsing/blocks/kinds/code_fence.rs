use crate::parsing::{
    ast::{CODE, Node, NodeData, NodeKind, PARAGRAPH, TABLE},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer,
        ContinuationResult, OpenerContext, OpenerResult, RawChild, RawNode,
    },
    points::{
        EatingLine, Span,
        text::{literal, unescape_and_decode},
    },
};

const FENCED_CODE: NodeKind = "fencedCode";

/// Code fenced by three or more backticks or tildes.
pub struct FencedCode {
    priority: i32,
}

impl FencedCode {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for FencedCode {
    fn default() -> Self {
        Self::with_priority(90)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceKind {
    Backticks,
    Tildes,
}

impl FenceKind {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '`' => Some(FenceKind::Backticks),
            '~' => Some(FenceKind::Tildes),
            _ => None,
        }
    }

    fn marker(self) -> char {
        match self {
            FenceKind::Backticks => '`',
            FenceKind::Tildes => '~',
        }
    }
}

#[derive(Debug)]
struct FenceState {
    kind: FenceKind,
    length: usize,
    indent: usize,
    info: Span,
    lines: Vec<Span>,
}

/// Length of the marker run starting at the first non-whitespace point.
fn fence_run(line: &EatingLine<'_>, marker: char) -> usize {
    let start = line.first_non_whitespace_index;
    (start..line.content_end())
        .take_while(|&i| line.points[i].code_point == marker)
        .count()
}

impl BlockTokenizer for FencedCode {
    fn name(&self) -> &'static str {
        "fenced-code"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[FENCED_CODE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::CONTINUATION
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.preceding_space_count() > 3 {
            return None;
        }
        let kind = line.first_char().and_then(FenceKind::from_char)?;
        let length = fence_run(line, kind.marker());
        if length < 3 {
            return None;
        }
        let info_start = line.first_non_whitespace_index + length;
        let info_end = line.trimmed_end().max(info_start);
        if kind == FenceKind::Backticks
            && (info_start..info_end).any(|i| line.points[i].code_point == '`')
        {
            return None;
        }
        let state = BlockState::new(
            FENCED_CODE,
            Span::new(line.first_non_whitespace_index, line.trimmed_end()),
            FenceState {
                kind,
                length,
                indent: line.preceding_space_count(),
                info: Span::new(info_start, info_end),
                lines: Vec::new(),
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
        let Some(fence) = state.data_mut::<FenceState>() else {
            return ContinuationResult::NotMatched;
        };
        if line.preceding_space_count() <= 3 {
            let run = fence_run(line, fence.kind.marker());
            let after = line.first_non_whitespace_index + run;
            if run >= fence.length && line.trimmed_end() == after {
                return ContinuationResult::Matched {
                    next_index: line.end_index,
                    saturated: true,
                };
            }
        }
        let strip = line.preceding_space_count().min(fence.indent);
        fence
            .lines
            .push(Span::new(line.start_index + strip, line.end_index));
        ContinuationResult::Matched {
            next_index: line.end_index,
            saturated: false,
        }
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let fence = state.data::<FenceState>()?;
        let mut value: String = fence
            .lines
            .iter()
            .map(|span| literal(ctx.points, span.start, span.end))
            .collect();
        if value.ends_with('\n') {
            value.pop();
        }

        let info = unescape_and_decode(&literal(ctx.points, fence.info.start, fence.info.end));
        let info = info.trim();
        let (lang, meta) = match info.split_once(char::is_whitespace) {
            Some((lang, meta)) => (Some(lang.to_string()), Some(meta.trim().to_string())),
            None if info.is_empty() => (None, None),
            None => (Some(info.to_string()), None),
        };
        let node = Node::literal(CODE, value)
            .with_data(NodeData::Code {
                lang,
                meta: meta.filter(|m| !m.is_empty()),
            })
            .with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::leaf(node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{ast::ROOT, points::{LineRange, code_points}};

    fn opens(src: &str) -> bool {
        let points = code_points(src);
        let line = EatingLine::new(&points, LineRange { start: 0, end: points.len() });
        let root = BlockState::new(ROOT, Span::default(), ());
        let ctx = OpenerContext { parent: &root, previous: None, interrupting: None };
        FencedCode::default().eat_opener(&line, &ctx).is_some()
    }

    #[test]
    fn detect_backtick_fence() {
        assert!(opens("```rust"));
    }

    #[test]
    fn detect_tilde_fence() {
        assert!(opens("~~~"));
    }

    #[test]
    fn no_fence() {
        assert!(!opens("hello"));
        assert!(!opens("``"));
        assert!(!opens("    ```"));
    }

    #[test]
    fn backtick_info_cannot_contain_backticks() {
        assert!(!opens("``` a`b"));
        assert!(opens("~~~ a`b"));
    }
}
