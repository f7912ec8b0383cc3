use bitflags::bitflags;

use crate::parsing::{
    ast::{Node, NodeKind},
    points::{EatingLine, LineRange, NodePoint},
};

use super::types::{
    BlockParseContext, BlockParsed, BlockState, CloseOutcome, ContinuationResult,
    InterruptResult, MatchNode, OpenerContext, OpenerResult, RawChild,
};

bitflags! {
    /// Optional hooks a block tokenizer implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlockHooks: u8 {
        const INTERRUPT_PREVIOUS_SIBLING = 1 << 0;
        const CONTINUATION = 1 << 1;
        const LAZY_CONTINUATION = 1 << 2;
        const CLOSE = 1 << 3;
        const POST_MATCH = 1 << 4;
        const POST_PARSE = 1 << 5;
    }
}

/// A block-level grammar plugged into the matching engine.
///
/// Only `eat_opener` and `parse_block` are mandatory; the engine calls the
/// other hooks only when the matching flag is in [`hooks`](Self::hooks).
pub trait BlockTokenizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Higher runs first. Must be unique per phase.
    fn priority(&self) -> i32;

    /// Kinds this tokenizer produces states for.
    fn recognized_types(&self) -> &'static [NodeKind];

    /// Whether opened blocks may contain other blocks.
    fn is_container(&self) -> bool {
        false
    }

    fn hooks(&self) -> BlockHooks {
        BlockHooks::empty()
    }

    /// Kinds of open lazily-continuable leaves this opener may interrupt.
    fn interruptable_types(&self) -> &'static [NodeKind] {
        &[]
    }

    fn eat_opener(&self, line: &EatingLine<'_>, ctx: &OpenerContext<'_>) -> Option<OpenerResult>;

    fn eat_and_interrupt_previous_sibling(
        &self,
        _line: &EatingLine<'_>,
        _previous: &mut BlockState,
        _parent: NodeKind,
    ) -> Option<InterruptResult> {
        None
    }

    fn eat_continuation_text(
        &self,
        _line: &EatingLine<'_>,
        _state: &mut BlockState,
    ) -> ContinuationResult {
        ContinuationResult::NotMatched
    }

    /// Accepts a line lacking the markers of the enclosing containers.
    /// Returns the index where consumption stopped.
    fn eat_lazy_continuation_text(
        &self,
        _line: &EatingLine<'_>,
        _state: &mut BlockState,
    ) -> Option<usize> {
        None
    }

    fn on_close(&self, _state: &mut BlockState) -> CloseOutcome {
        CloseOutcome::Keep
    }

    /// Rewrites a list of closed siblings; children are already processed.
    fn post_match(&self, nodes: Vec<MatchNode>, _points: &[NodePoint]) -> Vec<MatchNode> {
        nodes
    }

    /// Builds the parse-phase node; `None` drops the block.
    fn parse_block(
        &self,
        state: &BlockState,
        children: Vec<RawChild>,
        ctx: &BlockParseContext<'_>,
    ) -> Option<BlockParsed>;

    /// Rewrites a final sibling list after inline resolution.
    fn post_parse(&self, _nodes: &mut Vec<Node>) {}
}

/// The tokenizer that absorbs content no other tokenizer opens.
pub trait FallbackBlockTokenizer: BlockTokenizer {
    fn as_block(&self) -> &dyn BlockTokenizer;

    /// Rebuilds a state from lines handed back by a failed or finished
    /// block. `None` when the lines hold no content.
    fn from_lines(&self, lines: &[LineRange], points: &[NodePoint]) -> Option<BlockState>;
}
