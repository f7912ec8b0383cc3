use crate::{
    options::DEFAULT_MAX_NESTING,
    parsing::{
        ast::{NodeKind, ROOT},
        points::{EatingLine, LineRange, NodePoint, Span, lines},
        registry::BlockRegistry,
    },
};

use super::{
    tokenizer::{BlockHooks, BlockTokenizer},
    types::{
        BlockId, BlockState, CloseOutcome, ContinuationResult, MatchNode, OpenerContext,
    },
};

const ROOT_ID: BlockId = 0;

/// Drives block tokenizers over lines and builds the working tree.
///
/// Each line runs through three steps:
///
/// 1. walk down the open blocks, letting each continue on the line;
/// 2. try openers (or interrupts of the previous sibling) where the walk stopped;
/// 3. otherwise lazily continue the deepest open leaf, or hand the rest of
///    the line to the fallback tokenizer.
///
/// Blocks left unmatched in step 1 close as soon as a new block opens or
/// the line is not lazily continued. No block opens below `max_depth`
/// ancestors; the rest of such a line goes to the fallback tokenizer.
pub struct BlockBuilder<'a> {
    registry: &'a BlockRegistry,
    points: &'a [NodePoint],
    arena: Vec<BlockState>,
    max_depth: usize,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(registry: &'a BlockRegistry, points: &'a [NodePoint], start: usize) -> Self {
        Self {
            registry,
            points,
            arena: vec![BlockState::new(ROOT, Span::new(start, start), ())],
            max_depth: DEFAULT_MAX_NESTING,
        }
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Matches every line of `points[start..end]`.
    pub fn run(mut self, start: usize, end: usize) -> Vec<MatchNode> {
        for range in lines(self.points, start, end) {
            self.push(range);
        }
        self.finish()
    }

    pub fn push(&mut self, range: LineRange) {
        let registry = self.registry;
        let mut line = EatingLine::new(self.points, range);

        // Step 1: continue open blocks.
        let mut parent = ROOT_ID;
        let mut depth = 0;
        let mut unmatched: Option<BlockId> = None;
        while let Some(child) = self.open_last_child(parent) {
            let Some(tokenizer) = self.tokenizer(child) else {
                unmatched = Some(child);
                break;
            };
            if !tokenizer.hooks().contains(BlockHooks::CONTINUATION) {
                unmatched = Some(child);
                break;
            }
            match tokenizer.eat_continuation_text(&line, &mut self.arena[child]) {
                ContinuationResult::Matched {
                    next_index,
                    saturated,
                } => {
                    let from = line.start_index;
                    line.advance_to(next_index);
                    if let Some(end) = self.consumed_end(from, line.start_index) {
                        self.touch(child, end);
                    }
                    if saturated {
                        self.close(child);
                        break;
                    }
                    parent = child;
                    depth += 1;
                }
                ContinuationResult::NotMatched => {
                    unmatched = Some(child);
                    break;
                }
                ContinuationResult::Failed { lines } => {
                    unmatched = self.replace_with_fallback(child, &lines);
                    break;
                }
                ContinuationResult::Finished { lines } => {
                    self.close(child);
                    let rebuilt = registry.fallback().from_lines(&lines, self.points);
                    unmatched = rebuilt.map(|state| self.append(parent, state));
                    break;
                }
            }
        }

        // Step 2: open new blocks.
        let mut opened = false;
        let mut interrupting = self.interruptible_kind();
        while !line.is_consumed() && depth < self.max_depth && self.accepts_children(parent) {
            let mut new_block = None;
            for tokenizer in registry.matchers() {
                if !opened
                    && tokenizer
                        .hooks()
                        .contains(BlockHooks::INTERRUPT_PREVIOUS_SIBLING)
                    && let Some(previous) =
                        unmatched.filter(|&id| self.arena[id].parent == Some(parent))
                {
                    let parent_kind = self.arena[parent].kind;
                    if let Some(result) = tokenizer.eat_and_interrupt_previous_sibling(
                        &line,
                        &mut self.arena[previous],
                        parent_kind,
                    ) {
                        if result.remove_previous_sibling {
                            self.detach(previous);
                        } else {
                            self.close(previous);
                        }
                        unmatched = None;
                        new_block = Some((result.next_index, result.state));
                        break;
                    }
                }
                if let Some(kind) = interrupting
                    && !tokenizer.interruptable_types().contains(&kind)
                {
                    continue;
                }
                let ctx = self.opener_context(parent, interrupting);
                if let Some(result) = tokenizer.eat_opener(&line, &ctx) {
                    new_block = Some((result.next_index, result.state));
                    break;
                }
            }

            let Some((next_index, state)) = new_block else {
                break;
            };
            if let Some(previous) = unmatched.take() {
                self.close(previous);
            }
            opened = true;
            interrupting = None;
            let progressed = next_index > line.start_index;
            line.advance_to(next_index);
            parent = self.append(parent, state);
            depth += 1;
            if !progressed {
                break;
            }
        }

        // Step 3: lazy continuation or fallback.
        if line.is_consumed() {
            if !opened && let Some(previous) = unmatched {
                self.close(previous);
            }
            return;
        }

        if !opened && !line.is_blank() && self.lazy_continue(parent, &line) {
            return;
        }
        if let Some(previous) = unmatched {
            self.close(previous);
        }
        if !line.is_blank() && self.accepts_children(parent) {
            let fallback = registry.fallback();
            let ctx = self.opener_context(parent, None);
            if let Some(result) = fallback.eat_opener(&line, &ctx) {
                self.append(parent, result.state);
            }
        }
    }

    /// Closes every open block and returns the top-level children.
    pub fn finish(mut self) -> Vec<MatchNode> {
        self.close(ROOT_ID);
        let mut slots: Vec<Option<BlockState>> = self.arena.into_iter().map(Some).collect();
        take_tree(&mut slots, ROOT_ID)
            .map(|root| root.children)
            .unwrap_or_default()
    }

    fn tokenizer(&self, id: BlockId) -> Option<&'a dyn BlockTokenizer> {
        let registry: &'a BlockRegistry = self.registry;
        registry.tokenizer_for(self.arena[id].kind)
    }

    fn opener_context(&self, parent: BlockId, interrupting: Option<NodeKind>) -> OpenerContext<'_> {
        OpenerContext {
            parent: &self.arena[parent],
            previous: self.open_last_child(parent).map(|id| &self.arena[id]),
            interrupting,
        }
    }

    fn open_last_child(&self, id: BlockId) -> Option<BlockId> {
        let &child = self.arena[id].children.last()?;
        self.arena[child].opening.then_some(child)
    }

    fn deepest_open(&self, from: BlockId) -> BlockId {
        let mut id = from;
        while let Some(child) = self.open_last_child(id) {
            id = child;
        }
        id
    }

    fn accepts_children(&self, id: BlockId) -> bool {
        id == ROOT_ID || self.tokenizer(id).is_some_and(|t| t.is_container())
    }

    fn has_hook(&self, id: BlockId, hook: BlockHooks) -> bool {
        id != ROOT_ID && self.tokenizer(id).is_some_and(|t| t.hooks().contains(hook))
    }

    /// Kind of the deepest open block when it is a lazily-continuable leaf.
    fn interruptible_kind(&self) -> Option<NodeKind> {
        let deepest = self.deepest_open(ROOT_ID);
        self.has_hook(deepest, BlockHooks::LAZY_CONTINUATION)
            .then(|| self.arena[deepest].kind)
    }

    fn lazy_continue(&mut self, parent: BlockId, line: &EatingLine<'_>) -> bool {
        let last = self.deepest_open(parent);
        if last == parent || !self.has_hook(last, BlockHooks::LAZY_CONTINUATION) {
            return false;
        }
        let Some(tokenizer) = self.tokenizer(last) else {
            return false;
        };
        match tokenizer.eat_lazy_continuation_text(line, &mut self.arena[last]) {
            Some(next_index) => {
                if let Some(end) = self.consumed_end(line.start_index, next_index) {
                    self.touch(last, end);
                }
                true
            }
            None => false,
        }
    }

    /// End of the last non-whitespace point in `[from, to)`.
    fn consumed_end(&self, from: usize, to: usize) -> Option<usize> {
        (from..to.min(self.points.len()))
            .rev()
            .find(|&i| !matches!(self.points[i].code_point, ' ' | '\n'))
            .map(|i| i + 1)
    }

    /// Extends the span end of `id` and all its ancestors.
    fn touch(&mut self, id: BlockId, end: usize) {
        let mut current = Some(id);
        while let Some(id) = current {
            self.arena[id].touch_end(end);
            current = self.arena[id].parent;
        }
    }

    fn append(&mut self, parent: BlockId, mut state: BlockState) -> BlockId {
        let id = self.arena.len();
        log::trace!("open {} #{id} under #{parent}", state.kind);
        state.parent = Some(parent);
        let end = state.span.end;
        self.arena.push(state);
        self.arena[parent].children.push(id);
        if end > self.arena[parent].span.end {
            self.touch(parent, end);
        }
        id
    }

    fn detach(&mut self, id: BlockId) {
        log::trace!("drop {} #{id}", self.arena[id].kind);
        self.arena[id].opening = false;
        if let Some(parent) = self.arena[id].parent {
            self.arena[parent].children.retain(|&c| c != id);
        }
    }

    /// Rebuilds `id` in place as fallback content; the new block stays open.
    fn replace_with_fallback(&mut self, id: BlockId, lines: &[LineRange]) -> Option<BlockId> {
        let registry = self.registry;
        match registry.fallback().from_lines(lines, self.points) {
            Some(mut state) => {
                log::trace!("reinterpret {} #{id} as {}", self.arena[id].kind, state.kind);
                state.parent = self.arena[id].parent;
                self.arena[id] = state;
                Some(id)
            }
            None => {
                self.detach(id);
                None
            }
        }
    }

    fn close(&mut self, id: BlockId) {
        if !self.arena[id].opening {
            return;
        }
        if let Some(child) = self.open_last_child(id) {
            self.close(child);
        }
        self.arena[id].opening = false;
        log::trace!("close {} #{id}", self.arena[id].kind);

        if !self.has_hook(id, BlockHooks::CLOSE) {
            return;
        }
        let Some(tokenizer) = self.tokenizer(id) else {
            return;
        };
        match tokenizer.on_close(&mut self.arena[id]) {
            CloseOutcome::Keep => {}
            CloseOutcome::Reinterpret(lines) => {
                if self.replace_with_fallback(id, &lines).is_some() {
                    self.close(id);
                }
            }
            CloseOutcome::KeepAndReinterpret(lines) => {
                let Some(parent) = self.arena[id].parent else {
                    return;
                };
                let registry = self.registry;
                if let Some(mut state) = registry.fallback().from_lines(&lines, self.points) {
                    state.opening = false;
                    state.parent = Some(parent);
                    let new_id = self.arena.len();
                    log::trace!("split {} #{new_id} after #{id}", state.kind);
                    self.arena.push(state);
                    let siblings = &mut self.arena[parent].children;
                    let at = siblings
                        .iter()
                        .position(|&c| c == id)
                        .map_or(siblings.len(), |p| p + 1);
                    siblings.insert(at, new_id);
                }
            }
        }
    }
}

fn take_tree(slots: &mut [Option<BlockState>], id: BlockId) -> Option<MatchNode> {
    let mut state = slots.get_mut(id)?.take()?;
    let children = std::mem::take(&mut state.children)
        .into_iter()
        .filter_map(|child| take_tree(slots, child))
        .collect();
    Some(MatchNode { state, children })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{
        points::code_points,
        registry::{Phases, Registered},
    };
    use crate::parsing::blocks::kinds::{
        AtxHeading, BlockQuote, FencedCode, IndentedCode, LinkDefinition, ListItem, Paragraph,
        SetextHeading, ThematicBreak,
    };

    fn registry() -> BlockRegistry {
        let entries: Vec<Registered<dyn BlockTokenizer>> = vec![
            Registered { tokenizer: Box::new(FencedCode::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(BlockQuote::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(AtxHeading::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(SetextHeading::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(ThematicBreak::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(ListItem::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(IndentedCode::default()), phases: Phases::all() },
            Registered { tokenizer: Box::new(LinkDefinition::default()), phases: Phases::all() },
        ];
        BlockRegistry::new(entries, Box::new(Paragraph::default())).unwrap()
    }

    fn shape(nodes: &[MatchNode]) -> String {
        nodes
            .iter()
            .map(|n| {
                if n.children.is_empty() {
                    n.state.kind.to_string()
                } else {
                    format!("{}({})", n.state.kind, shape(&n.children))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn matched(src: &str) -> String {
        let registry = registry();
        let points = code_points(src);
        shape(&BlockBuilder::new(&registry, &points, 0).run(0, points.len()))
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert_eq!(matched(""), "");
        assert_eq!(matched("\n\n   \n"), "");
    }

    #[test]
    fn blank_line_separates_paragraphs() {
        assert_eq!(matched("a\nb\n\nc"), "paragraph paragraph");
    }

    #[test]
    fn heading_interrupts_paragraph() {
        assert_eq!(matched("a\n# b\nc"), "paragraph heading paragraph");
    }

    #[test]
    fn setext_replaces_paragraph() {
        assert_eq!(matched("Foo\n===\n"), "setextHeading");
    }

    #[test]
    fn indented_code_cannot_interrupt_paragraph() {
        assert_eq!(matched("a\n    b"), "paragraph");
        assert_eq!(matched("    b"), "indentedCode");
    }

    #[test]
    fn lazy_continuation_inside_block_quote() {
        assert_eq!(matched("> a\nb"), "blockquote(paragraph)");
        assert_eq!(matched("> a\n\nb"), "blockquote(paragraph) paragraph");
    }

    #[test]
    fn nested_containers() {
        assert_eq!(matched("> - a\n>   b"), "blockquote(listItem(paragraph))");
    }

    #[test]
    fn depth_limit_hands_the_rest_to_the_fallback() {
        let registry = registry();
        let points = code_points(">>> a\n>>> b");
        let tree = BlockBuilder::new(&registry, &points, 0)
            .with_max_depth(2)
            .run(0, points.len());
        assert_eq!(shape(&tree), "blockquote(blockquote(paragraph))");
    }

    #[test]
    fn fence_swallows_other_syntax() {
        assert_eq!(matched("```\n# not a heading\n```\nafter"), "fencedCode paragraph");
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        assert_eq!(matched("```\n> a\n\n- b"), "fencedCode");
    }

    #[test]
    fn definition_then_paragraph() {
        assert_eq!(matched("[a]: /u\nb"), "definition paragraph");
    }

    #[test]
    fn failed_definition_becomes_paragraph() {
        assert_eq!(matched("[a]: /u \"unterminated\nstill\n\nnext"), "paragraph paragraph");
    }

    #[test]
    fn spans_track_content() {
        let registry = registry();
        let points = code_points("> a\n> bc\n\nd");
        let tree = BlockBuilder::new(&registry, &points, 0).run(0, points.len());
        assert_eq!(tree[0].state.span, Span::new(0, 8));
        assert_eq!(tree[0].children[0].state.span, Span::new(2, 8));
        assert_eq!(tree[1].state.span, Span::new(10, 11));
    }
}
