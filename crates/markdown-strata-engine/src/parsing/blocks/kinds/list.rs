use crate::parsing::{
    ast::{LIST, LIST_ITEM, Node, NodeData, NodeKind, PARAGRAPH, TABLE},
    blocks::{
        BlockHooks, BlockParseContext, BlockParsed, BlockState, BlockTokenizer,
        ContinuationResult, MatchNode, OpenerContext, OpenerResult, PhrasingState, RawChild,
        RawNode,
    },
    points::{EatingLine, NodePoint, Span},
};

const MAX_ORDINAL_DIGITS: usize = 9;

/// Bullet and ordered list items.
///
/// Items are matched one by one; consecutive items with the same marker
/// are grouped into a `list` after matching, which is also when GFM task
/// list checkboxes are cut from the start of each item's first paragraph.
pub struct ListItem {
    priority: i32,
    task_list: bool,
}

impl ListItem {
    pub fn with_priority(priority: i32) -> Self {
        Self {
            priority,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_task_list(mut self, task_list: bool) -> Self {
        self.task_list = task_list;
        self
    }
}

impl Default for ListItem {
    fn default() -> Self {
        Self {
            priority: 40,
            task_list: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    ordered: bool,
    start: u64,
    /// Bullet character, or the `.` / `)` delimiter of an ordinal.
    symbol: char,
}

impl Marker {
    fn continues(self, other: Marker) -> bool {
        self.ordered == other.ordered && self.symbol == other.symbol
    }
}

#[derive(Debug)]
struct ItemState {
    marker: Marker,
    content_indent: usize,
    starts_blank: bool,
    spread: bool,
    checked: Option<bool>,
}

#[derive(Debug)]
struct ListState {
    marker: Marker,
    spread: bool,
}

/// Recognizes a list marker; returns it with the index just after it.
fn eat_marker(line: &EatingLine<'_>) -> Option<(Marker, usize)> {
    if line.preceding_space_count() > 3 {
        return None;
    }
    let start = line.first_non_whitespace_index;
    let first = line.first_char()?;
    let (marker, end) = if matches!(first, '-' | '+' | '*') {
        (
            Marker {
                ordered: false,
                start: 0,
                symbol: first,
            },
            start + 1,
        )
    } else {
        let digits = (start..line.content_end())
            .take_while(|&i| line.points[i].code_point.is_ascii_digit())
            .count();
        if digits == 0 || digits > MAX_ORDINAL_DIGITS {
            return None;
        }
        let symbol = line.char_at(start + digits).filter(|c| matches!(c, '.' | ')'))?;
        let number: String = line.points[start..start + digits]
            .iter()
            .map(|p| p.code_point)
            .collect();
        (
            Marker {
                ordered: true,
                start: number.parse().ok()?,
                symbol,
            },
            start + digits + 1,
        )
    };
    match line.char_at(end) {
        None | Some(' ') | Some('\n') => Some((marker, end)),
        Some(_) => None,
    }
}

fn last_line(points: &[NodePoint], span: Span) -> usize {
    points
        .get(span.end.saturating_sub(1))
        .map_or(0, |p| p.line)
}

fn first_line(points: &[NodePoint], span: Span) -> usize {
    points.get(span.start).map_or(0, |p| p.line)
}

/// True when a blank line separates any two consecutive nodes.
fn has_gap(nodes: &[MatchNode], points: &[NodePoint]) -> bool {
    nodes.windows(2).any(|pair| {
        first_line(points, pair[1].state.span) > last_line(points, pair[0].state.span) + 1
    })
}

fn build_list(mut items: Vec<MatchNode>, marker: Marker, points: &[NodePoint]) -> MatchNode {
    let mut spread = has_gap(&items, points);
    for item in &mut items {
        let item_spread = has_gap(&item.children, points);
        if let Some(state) = item.state.data_mut::<ItemState>() {
            state.spread = item_spread;
        }
        spread |= item_spread;
    }
    let start = items.first().map_or(0, |i| i.state.span.start);
    let end = items.last().map_or(start, |i| i.state.span.end);
    let mut state = BlockState::new(LIST, Span::new(start, end), ListState { marker, spread });
    state.opening = false;
    MatchNode {
        state,
        children: items,
    }
}

fn item_marker(node: &MatchNode) -> Option<Marker> {
    if node.state.kind != LIST_ITEM {
        return None;
    }
    node.state.data::<ItemState>().map(|item| item.marker)
}

/// Recognizes a `[ ]` / `[x]` checkbox opening the item's first line and
/// removes it from the paragraph's raw lines.
///
/// The checkbox must be followed by whitespace and then some text.
fn take_checkbox(item: &mut MatchNode, points: &[NodePoint]) -> Option<bool> {
    let item_line = first_line(points, item.state.span);
    let paragraph = item
        .children
        .first_mut()
        .filter(|n| n.state.kind == PARAGRAPH)?;
    let phrasing = paragraph.state.data_mut::<PhrasingState>()?;
    let first = *phrasing.lines.first()?;
    let at = first.first_non_whitespace;
    let point = |i: usize| points.get(i).filter(|_| i < first.end);

    if point(at)?.line != item_line {
        return None;
    }
    let mark = point(at + 1)?;
    let checked = match (point(at)?.code_point, mark.code_point, point(at + 2)?.code_point) {
        ('[', ' ', ']') if mark.tab.is_none() => false,
        ('[', 'x' | 'X', ']') => true,
        _ => return None,
    };
    if !matches!(point(at + 3)?.code_point, ' ' | '\n') {
        return None;
    }

    let mut rest = at + 3;
    while point(rest).is_some_and(|p| p.code_point == ' ') {
        rest += 1;
    }
    let line_has_text = point(rest).is_some_and(|p| p.code_point != '\n');
    let content_start = if line_has_text {
        rest
    } else {
        phrasing.lines.get(1)?.first_non_whitespace
    };

    phrasing.lines[0].first_non_whitespace = if line_has_text { rest } else { first.end };
    paragraph.state.span.start = content_start;
    Some(checked)
}

impl BlockTokenizer for ListItem {
    fn name(&self) -> &'static str {
        "list"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn recognized_types(&self) -> &'static [NodeKind] {
        &[LIST, LIST_ITEM]
    }

    fn is_container(&self) -> bool {
        true
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::CONTINUATION | BlockHooks::POST_MATCH
    }

    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[PARAGRAPH, TABLE]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, ctx: &OpenerContext<'_>) -> Option<OpenerResult> {
        let (marker, marker_end) = eat_marker(line)?;
        let after = line.advanced(marker_end);
        let starts_blank = after.is_blank();

        let continues_list = ctx.previous.is_some_and(|p| p.kind == LIST_ITEM);
        if ctx.interrupting == Some(PARAGRAPH)
            && !continues_list
            && (starts_blank || (marker.ordered && marker.start != 1))
        {
            return None;
        }

        let spaces = after.preceding_space_count();
        let padding = if starts_blank || spaces > 4 { 1 } else { spaces };
        let content_indent = marker_end - line.start_index + padding;
        let next_index = if starts_blank {
            line.end_index
        } else {
            marker_end + padding
        };
        let state = BlockState::new(
            LIST_ITEM,
            Span::new(line.first_non_whitespace_index, marker_end),
            ItemState {
                marker,
                content_indent,
                starts_blank,
                spread: false,
                checked: None,
            },
        );
        Some(OpenerResult { next_index, state })
    }

    fn eat_continuation_text(
        &self,
        line: &EatingLine<'_>,
        state: &mut BlockState,
    ) -> ContinuationResult {
        let Some(item) = state.data::<ItemState>() else {
            return ContinuationResult::NotMatched;
        };
        if line.is_blank() {
            if state.children.is_empty() && item.starts_blank {
                return ContinuationResult::NotMatched;
            }
            return ContinuationResult::Matched {
                next_index: line
                    .first_non_whitespace_index
                    .min(line.start_index + item.content_indent),
                saturated: false,
            };
        }
        if line.preceding_space_count() >= item.content_indent {
            return ContinuationResult::Matched {
                next_index: line.start_index + item.content_indent,
                saturated: false,
            };
        }
        ContinuationResult::NotMatched
    }

    fn post_match(&self, mut nodes: Vec<MatchNode>, points: &[NodePoint]) -> Vec<MatchNode> {
        if self.task_list {
            for node in nodes.iter_mut().filter(|n| n.state.kind == LIST_ITEM) {
                let checked = take_checkbox(node, points);
                if let Some(item) = node.state.data_mut::<ItemState>() {
                    item.checked = checked;
                }
            }
        }

        let mut out = Vec::with_capacity(nodes.len());
        let mut iter = nodes.into_iter().peekable();
        while let Some(node) = iter.next() {
            let Some(marker) = item_marker(&node) else {
                out.push(node);
                continue;
            };
            let mut items = vec![node];
            while let Some(next) =
                iter.next_if(|n| item_marker(n).is_some_and(|m| m.continues(marker)))
            {
                items.push(next);
            }
            out.push(build_list(items, marker, points));
        }
        out
    }

    fn parse_block(
        &self,
        state: &BlockState,
        children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed> {
        let data = if let Some(list) = state.data::<ListState>() {
            NodeData::List {
                ordered: list.marker.ordered,
                start: list.marker.ordered.then_some(list.marker.start),
                spread: list.spread,
                marker: list.marker.symbol,
            }
        } else {
            let item = state.data::<ItemState>()?;
            NodeData::ListItem {
                spread: item.spread,
                checked: item.checked,
            }
        };
        let node = Node::new(state.kind)
            .with_data(data)
            .with_position(ctx.position_of(state.span));
        Some(BlockParsed::Flow(RawNode::new(node, children)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::{LineRange, code_points};
    use rstest::rstest;

    fn marker(src: &str) -> Option<(bool, u64, char, usize)> {
        let points = code_points(src);
        let line = EatingLine::new(&points, LineRange { start: 0, end: points.len() });
        eat_marker(&line).map(|(m, end)| (m.ordered, m.start, m.symbol, end))
    }

    #[rstest]
    #[case("- a", Some((false, 0, '-', 1)))]
    #[case("* a", Some((false, 0, '*', 1)))]
    #[case("-", Some((false, 0, '-', 1)))]
    #[case("1. a", Some((true, 1, '.', 2)))]
    #[case("  42) a", Some((true, 42, ')', 5)))]
    #[case("-a", None)]
    #[case("1.a", None)]
    #[case("1234567890. a", None)]
    #[case("    - a", None)]
    #[case("a. b", None)]
    fn markers(#[case] src: &str, #[case] expected: Option<(bool, u64, char, usize)>) {
        assert_eq!(marker(src), expected);
    }
}
