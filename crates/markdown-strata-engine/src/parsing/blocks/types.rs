use std::any::Any;
use std::fmt;

use crate::parsing::{
    ast::{Definition, Node, NodeKind, Position},
    points::{LineRange, NodePoint, Span},
};

use super::content::PhrasingContent;

/// Index of a block state in the working arena. The root is always 0.
pub type BlockId = usize;

/// A node of the working block tree.
///
/// Tokenizer-specific state lives in `data` and is recovered with
/// [`BlockState::data`]; the engine only looks at the structural fields.
pub struct BlockState {
    pub kind: NodeKind,
    pub opening: bool,
    pub parent: Option<BlockId>,
    pub children: Vec<BlockId>,
    /// Points covered so far; `end` grows as lines are consumed.
    pub span: Span,
    pub data: Box<dyn Any + Send>,
}

impl BlockState {
    pub fn new<T: Any + Send>(kind: NodeKind, span: Span, data: T) -> Self {
        Self {
            kind,
            opening: true,
            parent: None,
            children: Vec::new(),
            span,
            data: Box::new(data),
        }
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.downcast_mut::<T>()
    }

    /// Extends the span end, never shrinking it.
    pub fn touch_end(&mut self, end: usize) {
        self.span.end = self.span.end.max(end);
    }
}

impl fmt::Debug for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockState")
            .field("kind", &self.kind)
            .field("opening", &self.opening)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("span", &self.span)
            .finish_non_exhaustive()
    }
}

/// A new block recognized at the start of a line.
#[derive(Debug)]
pub struct OpenerResult {
    /// First point not consumed by the opener.
    pub next_index: usize,
    pub state: BlockState,
}

/// A new block that takes over its previous sibling.
#[derive(Debug)]
pub struct InterruptResult {
    pub next_index: usize,
    pub state: BlockState,
    /// Drop the sibling instead of closing it (its content moved into `state`).
    pub remove_previous_sibling: bool,
}

/// Outcome of offering a line to an open block.
#[derive(Debug)]
pub enum ContinuationResult {
    /// The block accepts the line up to `next_index`. A saturated block
    /// closes immediately after this line.
    Matched { next_index: usize, saturated: bool },
    /// The block does not continue on this line.
    NotMatched,
    /// The block was never valid; its buffered lines are reinterpreted by
    /// the fallback tokenizer, which also receives the current line.
    Failed { lines: Vec<LineRange> },
    /// The block completed on an earlier line; `lines` it buffered beyond
    /// its end are handed to the fallback tokenizer.
    Finished { lines: Vec<LineRange> },
}

/// Result of the close hook.
#[derive(Debug)]
pub enum CloseOutcome {
    Keep,
    /// Replace the block with fallback content built from `lines`.
    Reinterpret(Vec<LineRange>),
    /// Keep the block and add fallback content built from `lines` after it.
    KeepAndReinterpret(Vec<LineRange>),
}

/// What an opener may know about where it is opening.
#[derive(Debug, Clone, Copy)]
pub struct OpenerContext<'a> {
    pub parent: &'a BlockState,
    /// The parent's last child, if still open.
    pub previous: Option<&'a BlockState>,
    /// Kind of the open lazily-continuable leaf the opener would interrupt.
    pub interrupting: Option<NodeKind>,
}

/// A closed block with its children, as seen by post-match hooks.
#[derive(Debug)]
pub struct MatchNode {
    pub state: BlockState,
    pub children: Vec<MatchNode>,
}

/// A parsed block awaiting inline resolution.
#[derive(Debug)]
pub struct RawNode {
    pub node: Node,
    pub children: Vec<RawChild>,
}

impl RawNode {
    pub fn new(node: Node, children: Vec<RawChild>) -> Self {
        Self { node, children }
    }

    pub fn leaf(node: Node) -> Self {
        Self::new(node, Vec::new())
    }
}

#[derive(Debug)]
pub enum RawChild {
    Block(RawNode),
    /// Text still to be resolved into inline nodes.
    Phrasing(PhrasingContent),
}

/// Classification of a parse-phase result.
#[derive(Debug)]
pub enum BlockParsed {
    Flow(RawNode),
    Meta(Definition),
}

/// Shared inputs of the block parse phase.
#[derive(Debug, Clone, Copy)]
pub struct BlockParseContext<'a> {
    pub points: &'a [NodePoint],
    pub position: bool,
}

impl BlockParseContext<'_> {
    pub fn position_of(&self, span: Span) -> Option<Position> {
        if self.position {
            Position::from_points(self.points, span.start, span.end)
        } else {
            None
        }
    }
}
