use crate::parsing::{
    ast::{HEADING, Node, NodeData, NodeKind, PARAGRAPH},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer, InterruptResult,
        OpenerContext, OpenerResult, PhrasingContent, PhrasingLine, PhrasingState, RawChild,
        RawNode,
    },
    points::{EatingLine, Span},
};

const SETEXT_HEADING: NodeKind = "setextHeading";

/// Turns a paragraph followed by a `===` or `---` underline into a heading.
pub struct SetextHeading {
    priority: i32,
}

impl SetextHeading {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for SetextHeading {
    fn default() -> Self {
        Self::with_priority(60)
    }
}

#[derive(Debug)]
struct SetextState {
    depth: u8,
    lines: Vec<PhrasingLine>,
}

/// Depth of an underline, if the line is one.
fn underline_depth(line: &EatingLine<'_>) -> Option<u8> {
    if line.preceding_space_count() > 3 {
        return None;
    }
    let marker = line.first_char()?;
    let depth = match marker {
        '=' => 1,
        '-' => 2,
        _ => return None,
    };
    let mut i = line.first_non_whitespace_index;
    while i < line.end_index && line.points[i].code_point == marker {
        i += 1;
    }
    (line.trimmed_end() == i).then_some(depth)
}

impl BlockTokenizer for SetextHeading {
    fn name(&self) -> &'static str {
        "setext-heading"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[SETEXT_HEADING]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::INTERRUPT_PREVIOUS_SIBLING
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH]
    }

    fn eat_opener(&self, _line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        None
    }

    fn eat_and_interrupt_previous_sibling(
        &self,
        line: &EatingLine<'_>,
        previous: &mut BlockState,
        _parent: NodeKind,
    ) -> Option<InterruptResult> {
        if previous.kind != PARAGRAPH || !previous.opening {
            return None;
        }
        let depth = underline_depth(line)?;
        let phrasing = previous.data_mut::<PhrasingState>()?;
        let lines = std::mem::take(&mut phrasing.lines);
        let state = BlockState::new(
            SETEXT_HEADING,
            Span::new(previous.span.start, line.trimmed_end()),
            SetextState { depth, lines },
        );
        Some(InterruptResult {
            next_index: line.end_index,
            state,
            remove_previous_sibling: true,
        })
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let heading = state.data::<SetextState>()?;
        let content = PhrasingContent::from_lines(ctx.points, &heading.lines);
        let node = Node::new(HEADING)
            .with_data(NodeData::Heading {
                depth: heading.depth,
            })
            .with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::new(
            node,
            vec![RawChild::Phrasing(content)],
        )))
    }
}
