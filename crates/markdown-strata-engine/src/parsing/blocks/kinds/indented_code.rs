use crate::parsing::{
    ast::{CODE, Node, NodeData, NodeKind},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer,
        ContinuationResult, OpenerContext, OpenerResult, RawChild, RawNode,
    },
    points::{EatingLine, Span, text::literal},
};

const INDENTED_CODE: NodeKind = "indentedCode";
const CODE_INDENT: usize = 4;

/// Code indented by four columns. Cannot interrupt a paragraph.
pub struct IndentedCode {
    priority: i32,
}

impl IndentedCode {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for IndentedCode {
    fn default() -> Self {
        Self::with_priority(30)
    }
}

#[derive(Debug)]
struct IndentedState {
    /// Content of each line after the indent, with a blank flag.
    lines: Vec<(Span, bool)>,
}

impl BlockTokenizer for IndentedCode {
    fn name(&self) -> &'static str {
        "indented-code"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[INDENTED_CODE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::CONTINUATION
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.is_blank() || line.preceding_space_count() < CODE_INDENT {
            return None;
        }
        let content_start = line.start_index + CODE_INDENT;
        let state = BlockState::new(
            INDENTED_CODE,
            Span::new(content_start, line.trimmed_end()),
            IndentedState {
                lines: vec![(Span::new(content_start, line.end_index), false)],
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
        let Some(code) = state.data_mut::<IndentedState>() else {
            return ContinuationResult::NotMatched;
        };
        let blank = line.is_blank();
        if !blank && line.preceding_space_count() < CODE_INDENT {
            return ContinuationResult::NotMatched;
        }
        let content_start = (line.start_index + CODE_INDENT).min(line.first_non_whitespace_index);
        code.lines
            .push((Span::new(content_start, line.end_index), blank));
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
        let code = state.data::<IndentedState>()?;
        let kept = code
            .lines
            .iter()
            .rposition(|(_, blank)| !blank)
            .map_or(0, |last| last + 1);
        let mut value: String = code.lines[..kept]
            .iter()
            .map(|(span, _)| literal(ctx.points, span.start, span.end))
            .collect();
        if value.ends_with('\n') {
            value.pop();
        }
        let node = Node::literal(CODE, value)
            .with_data(NodeData::Code {
                lang: None,
                meta: None,
            })
            .with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::leaf(node)))
    }
}
