//! # Block Parsing
//!
//! Line-oriented matching of block structure into a working tree, followed
//! by the post-match and parse phases that turn it into raw nodes.
//!
//! ## Modules
//!
//! - **`tokenizer`**: the `BlockTokenizer` trait and its optional hooks
//! - **`types`**: block states, hook results and raw parse output
//! - **`builder`**: `BlockBuilder`, the three-step line matching engine
//! - **`phases`**: post-match, parse, meta collection and post-parse coordinators
//! - **`content`**: phrasing lines and the points handed to inline parsing
//! - **`kinds`**: the bundled block grammars
//!
//! ## Key Invariants
//!
//! - Only the last child of an open block can be open
//! - A closed block is never reopened
//! - Block spans only grow while matching

pub mod builder;
pub mod content;
pub mod kinds;
pub mod phases;
pub mod tokenizer;
pub mod types;

pub use builder::BlockBuilder;
pub use content::{PhrasingContent, PhrasingLine, PhrasingState};
pub use tokenizer::{BlockHooks, BlockTokenizer, FallbackBlockTokenizer};
pub use types::{
    BlockId, BlockParseContext, BlockParsed, BlockState, CloseOutcome, ContinuationResult,
    InterruptResult, MatchNode, OpenerContext, OpenerResult, RawChild, RawNode,
};
