use crate::parsing::{
    ast::{BLOCKQUOTE, Node, NodeKind, PARAGRAPH, TABLE},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer,
        ContinuationResult, OpenerContext, OpenerResult, RawChild, RawNode,
    },
    points::{EatingLine, Span},
};

/// `>` block quotes.
pub struct BlockQuote {
    priority: i32,
}

impl BlockQuote {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for BlockQuote {
    fn default() -> Self {
        Self::with_priority(80)
    }
}

/// Index just past the `>` marker and one optional space.
fn eat_marker(line: &EatingLine<'_>) -> Option<usize> {
    if line.preceding_space_count() > 3 || line.first_char() != Some('>') {
        return None;
    }
    let after = line.first_non_whitespace_index + 1;
    Some(if line.char_at(after) == Some(' ') {
        after + 1
    } else {
        after
    })
}

impl BlockTokenizer for BlockQuote {
    fn name(&self) -> &'static str {
        "block-quote"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[BLOCKQUOTE]
    }

    fn is_container(&self) -> bool {
        true
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::CONTINUATION
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        let next_index = eat_marker(line)?;
        let start = line.first_non_whitespace_index;
        Some(OpenerResult {
            next_index,
            state: BlockState::new(BLOCKQUOTE, Span::new(start, start + 1), ()),
        })
    }

    fn eat_continuation_text(
        &self,
        line: &EatingLine<'_>,
        _state: &mut BlockState,
    ) -> ContinuationResult {
        match eat_marker(line) {
            Some(next_index) => ContinuationResult::Matched {
                next_index,
                saturated: false,
            },
            None => ContinuationResult::NotMatched,
        }
    }

    fn parse_block(
        &self,
        state: &BlockState,
        children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let node = Node::new(BLOCKQUOTE).with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::new(node, children)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::{LineRange, code_points};

    fn marker(src: &str) -> Option<usize> {
        let points = code_points(src);
        eat_marker(&EatingLine::new(&points, LineRange { start: 0, end: points.len() }))
    }

    #[test]
    fn marker_takes_one_optional_space() {
        assert_eq!(marker("> a"), Some(2));
        assert_eq!(marker(">a"), Some(1));
        assert_eq!(marker(">  a"), Some(2));
        assert_eq!(marker("   > a"), Some(5));
    }

    #[test]
    fn marker_after_tab_takes_one_column() {
        assert_eq!(marker(">\ta"), Some(2));
    }

    #[test]
    fn not_a_marker() {
        assert_eq!(marker("    > a"), None);
        assert_eq!(marker("a > b"), None);
    }
}
