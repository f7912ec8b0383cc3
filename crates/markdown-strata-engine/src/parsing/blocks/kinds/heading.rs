use crate::parsing::{
    ast::{HEADING, Node, NodeData, NodeKind, PARAGRAPH, TABLE},
    blocks::{
        BlockParseContext, BlockParsed, BlockState, BlockTokenizer, OpenerContext, OpenerResult,
        PhrasingContent, RawChild, RawNode,
    },
    points::{EatingLine, Span},
};

/// `#` to `######` headings.
pub struct AtxHeading {
    priority: i32,
}

impl AtxHeading {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for AtxHeading {
    fn default() -> Self {
        Self::with_priority(70)
    }
}

#[derive(Debug)]
struct AtxState {
    depth: u8,
    content: Span,
}

impl BlockTokenizer for AtxHeading {
    fn name(&self) -> &'static str {
        "atx-heading"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[HEADING]
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.preceding_space_count() > 3 || line.first_char() != Some('#') {
            return None;
        }
        let start = line.first_non_whitespace_index;
        let end = line.content_end();
        let mut i = start;
        while i < end && line.points[i].code_point == '#' {
            i += 1;
        }
        let depth = i - start;
        if depth > 6 || (i < end && line.points[i].code_point != ' ') {
            return None;
        }

        let trimmed = line.trimmed_end();
        let mut content_end = trimmed;
        let mut j = trimmed;
        while j > i && line.points[j - 1].code_point == '#' {
            j -= 1;
        }
        if j < trimmed && (j == i || line.points[j - 1].code_point == ' ') {
            content_end = j;
        }

        let state = BlockState::new(
            HEADING,
            Span::new(start, trimmed),
            AtxState {
                depth: depth as u8,
                content: Span::new(i, content_end.max(i)),
            },
        );
        Some(OpenerResult {
            next_index: line.end_index,
            state,
        })
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let heading = state.data::<AtxState>()?;
        let content = PhrasingContent::from_span(ctx.points, heading.content);
        let children = if content.is_empty() {
            Vec::new()
        } else {
            vec![RawChild::Phrasing(content)]
        };
        let node = Node::new(HEADING)
            .with_data(NodeData::Heading {
                depth: heading.depth,
            })
            .with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::new(node, children)))
    }
}
