use crate::parsing::{
    ast::{Node, NodeKind, PARAGRAPH, TABLE, THEMATIC_BREAK},
    blocks::{
        BlockParseContext, BlockParsed, BlockState, BlockTokenizer, OpenerContext, OpenerResult,
        RawChild, RawNode,
    },
    points::{EatingLine, Span},
};

/// `***`, `---` and `___` rules.
pub struct ThematicBreak {
    priority: i32,
}

impl ThematicBreak {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for ThematicBreak {
    fn default() -> Self {
        Self::with_priority(50)
    }
}

impl BlockTokenizer for ThematicBreak {
    fn name(&self) -> &'static str {
        "thematic-break"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[THEMATIC_BREAK]
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.preceding_space_count() > 3 {
            return None;
        }
        let marker = line.first_char().filter(|c| matches!(c, '*' | '-' | '_'))?;
        let mut count = 0;
        for i in line.first_non_whitespace_index..line.content_end() {
            match line.points[i].code_point {
                c if c == marker => count += 1,
                ' ' => {}
                _ => return None,
            }
        }
        if count < 3 {
            return None;
        }
        let state = BlockState::new(
            THEMATIC_BREAK,
            Span::new(line.first_non_whitespace_index, line.trimmed_end()),
            (),
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
        let node = Node::new(THEMATIC_BREAK).with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::leaf(node)))
    }
}
