use crate::parsing::{
    ast::{Align, Node, NodeData, NodeKind, PARAGRAPH, TABLE, TABLE_CELL, TABLE_ROW},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer, InterruptResult,
        OpenerContext, OpenerResult, PhrasingContent, PhrasingState, RawChild, RawNode,
    },
    points::{EatingLine, NodePoint, Span},
};

/// GFM tables. The header row is the last line of the paragraph the
/// delimiter row interrupts; body rows follow until a blank line or
/// another block.
pub struct Table {
    priority: i32,
}

impl Table {
    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::with_priority(65)
    }
}

#[derive(Debug)]
struct Row {
    span: Span,
    cells: Vec<Span>,
}

#[derive(Debug)]
struct TableState {
    align: Vec<Align>,
    rows: Vec<Row>,
}

fn trimmed_end(points: &[NodePoint], start: usize, end: usize) -> usize {
    let mut end = end.min(points.len());
    while end > start && matches!(points[end - 1].code_point, ' ' | '\n') {
        end -= 1;
    }
    end
}

/// Splits a row at unescaped pipes, ignoring a leading and trailing pipe.
fn split_cells(points: &[NodePoint], start: usize, end: usize) -> Vec<Span> {
    let mut i = start;
    if i < end && points[i].code_point == '|' {
        i += 1;
    }
    let mut cells = Vec::new();
    let mut cell_start = i;
    while i < end {
        match points[i].code_point {
            '\\' if i + 1 < end => {
                i += 2;
                continue;
            }
            '|' => {
                cells.push(Span::new(cell_start, i));
                cell_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if cell_start < end {
        cells.push(Span::new(cell_start, end));
    }
    cells
}

fn cell_align(points: &[NodePoint], cell: Span) -> Option<Align> {
    let text: String = points[cell.start..cell.end]
        .iter()
        .map(|p| p.code_point)
        .collect();
    let text = text.trim();
    let left = text.starts_with(':');
    let right = text.len() > 1 && text.ends_with(':');
    let dashes = text.trim_start_matches(':').trim_end_matches(':');
    if dashes.is_empty() || !dashes.chars().all(|c| c == '-') {
        return None;
    }
    Some(match (left, right) {
        (true, true) => Align::Center,
        (true, false) => Align::Left,
        (false, true) => Align::Right,
        (false, false) => Align::None,
    })
}

fn delimiter_row(line: &EatingLine<'_>) -> Option<Vec<Align>> {
    if line.preceding_space_count() > 3 || line.is_blank() {
        return None;
    }
    let start = line.first_non_whitespace_index;
    let end = line.trimmed_end();
    if !(start..end).any(|i| line.points[i].code_point == '|') {
        return None;
    }
    split_cells(line.points, start, end)
        .into_iter()
        .map(|cell| cell_align(line.points, cell))
        .collect()
}

impl BlockTokenizer for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[TABLE]
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::INTERRUPT_PREVIOUS_SIBLING | BlockHooks::LAZY_CONTINUATION
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
        let align = delimiter_row(line)?;
        let points = line.points;
        let phrasing = previous.data_mut::<PhrasingState>()?;
        let header_line = *phrasing.lines.last()?;
        let header_start = header_line.first_non_whitespace;
        let header_end = trimmed_end(points, header_start, header_line.end);
        let header = split_cells(points, header_start, header_end);
        if header.len() != align.len() {
            return None;
        }

        phrasing.lines.pop();
        let remaining_end = phrasing
            .lines
            .last()
            .map(|l| trimmed_end(points, l.first_non_whitespace, l.end));
        let remove_previous_sibling = remaining_end.is_none();
        if let Some(end) = remaining_end {
            previous.span.end = end;
        }

        let state = BlockState::new(
            TABLE,
            Span::new(header_start, line.trimmed_end()),
            TableState {
                align,
                rows: vec![Row {
                    span: Span::new(header_start, header_end),
                    cells: header,
                }],
            },
        );
        Some(InterruptResult {
            next_index: line.end_index,
            state,
            remove_previous_sibling,
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
        let table = state.data_mut::<TableState>()?;
        let start = line.first_non_whitespace_index;
        let end = line.trimmed_end();
        table.rows.push(Row {
            span: Span::new(start, end),
            cells: split_cells(line.points, start, end),
        });
        Some(line.end_index)
    }

    fn parse_block(
        &self,
        state: &BlockState,
        _children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let table = state.data::<TableState>()?;
        let rows = table
            .rows
            .iter()
            .map(|row| {
                let cells = (0..table.align.len())
                    .map(|column| {
                        let Some(&span) = row.cells.get(column) else {
                            return RawChild::Block(RawNode::leaf(Node::new(TABLE_CELL)));
                        };
                        let content = PhrasingContent::from_span(ctx.points, span);
                        let children = if content.is_empty() {
                            Vec::new()
                        } else {
                            vec![RawChild::Phrasing(content)]
                        };
                        let cell = Node::new(TABLE_CELL).with_position(ctx.position_of(span));
                        RawChild::Block(RawNode::new(cell, children))
                    })
                    .collect();
                let node = Node::new(TABLE_ROW).with_position(ctx.position_of(row.span));
                RawChild::Block(RawNode::new(node, cells))
            })
            .collect();
        let node = Node::new(TABLE)
            .with_data(NodeData::Table {
                align: table.align.clone(),
            })
            .with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::new(node, rows)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::{LineRange, code_points, text::literal};
    use rstest::rstest;

    fn cells(src: &str) -> Vec<String> {
        let points = code_points(src);
        split_cells(&points, 0, points.len())
            .into_iter()
            .map(|s| literal(&points, s.start, s.end).trim().to_string())
            .collect()
    }

    #[rstest]
    #[case("| a | b |", vec!["a", "b"])]
    #[case("a | b", vec!["a", "b"])]
    #[case(r"a \| b | c", vec![r"a \| b", "c"])]
    #[case("| a |  |", vec!["a", ""])]
    fn splits_cells(#[case] src: &str, #[case] expected: Vec<&str>) {
        assert_eq!(cells(src), expected);
    }

    #[rstest]
    #[case("| --- | :-- | --: | :-: |", Some(vec![Align::None, Align::Left, Align::Right, Align::Center]))]
    #[case("---|---", Some(vec![Align::None, Align::None]))]
    #[case("---", None)]
    #[case("| -x- |", None)]
    #[case("| : |", None)]
    fn delimiter_rows(#[case] src: &str, #[case] expected: Option<Vec<Align>>) {
        let points = code_points(src);
        let line = EatingLine::new(&points, LineRange { start: 0, end: points.len() });
        assert_eq!(delimiter_row(&line), expected);
    }
}
