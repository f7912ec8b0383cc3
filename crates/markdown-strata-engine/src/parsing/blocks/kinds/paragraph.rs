use crate::parsing::{
    ast::{Node, NodeKind, PARAGRAPH},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer,
        FallbackBlockTokenizer, OpenerContext, OpenerResult, PhrasingContent, PhrasingLine,
        PhrasingState, RawChild, RawNode,
    },
    points::{EatingLine, LineRange, NodePoint, Span},
};

/// Paragraphs absorb every non-blank line nothing else claims.
pub struct Paragraph {
    priority: i32,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self { priority: -1 }
    }
}

impl BlockTokenizer for Paragraph {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::LAZY_CONTINUATION
    }

    fn eat_opener(&self, line: &EatingLine<'_>, _ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        if line.is_blank() {
            return None;
        }
        let state = BlockState::new(
            PARAGRAPH,
            Span::new(line.first_non_whitespace_index, line.trimmed_end()),
            PhrasingState {
                lines: vec![PhrasingLine::from_eating(line)],
            },
        );
        Some(OpenerResult {
            next_index: line.end_index,
            state,
        })
    }

    fn eat_lazy_continuation_text(
        &self,
        line: &EatingLine<'_>,
        state: &mut BlockState,
    ) -> Option<usize> {
        if line.is_blank() {
            return None;
        }
        let phrasing = state.data_mut::<PhrasingState>()?;
        phrasing.lines.push(PhrasingLine::from_eating(line));
        Some(line.end_index)
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let phrasing = state.data::<PhrasingState>()?;
        let content = PhrasingContent::from_lines(ctx.points, &phrasing.lines);
        if content.is_empty() {
            return None;
        }
        let node = Node::new(PARAGRAPH).with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::new(
            node,
            vec![RawChild::Phrasing(content)],
        )))
    }
}

impl FallbackBlockTokenizer for Paragraph {
    fn as_block(&self) -> &dyn BlockTokenizer {
        self
    }

    fn from_lines(&self, lines: &[LineRange], points: &[NodePoint]) -> Option<BlockState> {
        let mut phrasing: Vec<PhrasingLine> = lines
            .iter()
            .map(|&range| PhrasingLine::from_range(points, range))
            .skip_while(|line| is_blank(points, line))
            .collect();
        while phrasing.last().is_some_and(|line| is_blank(points, line)) {
            phrasing.pop();
        }
        let first = phrasing.first()?;
        let last = phrasing.last()?;
        let mut end = last.end;
        while end > last.first_non_whitespace
            && matches!(points[end - 1].code_point, ' ' | '\n')
        {
            end -= 1;
        }
        let span = Span::new(first.first_non_whitespace, end);
        Some(BlockState::new(
            PARAGRAPH,
            span,
            PhrasingState { lines: phrasing },
        ))
    }
}

fn is_blank(points: &[NodePoint], line: &PhrasingLine) -> bool {
    line.first_non_whitespace >= line.end || points[line.first_non_whitespace].code_point == '\n'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::{code_points, lines};

    #[test]
    fn rebuilds_from_lines_without_blank_edges() {
        let points = code_points("\n  a\nb  \n\n");
        let ranges = lines(&points, 0, points.len());
        let state = Paragraph::default().from_lines(&ranges, &points).unwrap();
        let phrasing = state.data::<PhrasingState>().unwrap();
        assert_eq!(phrasing.lines.len(), 2);
        assert_eq!(state.span, Span::new(3, 6));
    }

    #[test]
    fn blank_lines_rebuild_nothing() {
        let points = code_points("  \n\n");
        let ranges = lines(&points, 0, points.len());
        assert!(Paragraph::default().from_lines(&ranges, &points).is_none());
    }
}
