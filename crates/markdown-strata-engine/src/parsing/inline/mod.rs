//! # Inline Resolution
//!
//! Turns the text of a phrasing leaf into nested inline nodes.
//!
//! ## Flow
//!
//! 1. Tokenizers run in priority order. Each one scans only the ranges not
//!    yet claimed by higher-priority tokens, collecting [`Delimiter`]s in
//!    its own [`ScanState`].
//! 2. The tokenizer pairs its delimiters into [`PotentialToken`]s.
//!    Accepted tokens claim their span.
//! 3. A sweep orders tokens by `(start, end)` and keeps a non-overlapping
//!    sequence; gaps become text.
//! 4. Inner ranges of each kept token are resolved recursively, with the
//!    token's forbidden descendant kinds added to the forbidden set.
//! 5. Matches are parsed into nodes; adjacent text is merged.
//!
//! ## Modules
//!
//! - **`tokenizer`**: `InlineTokenizer`, `TextTokenizer` and the `InlineContext` they read from
//! - **`types`**: delimiters, potential tokens and matches
//! - **`resolver`**: the resolution engine
//! - **`kinds`**: concrete grammars

pub mod kinds;
pub mod resolver;
pub mod tokenizer;
pub mod types;

pub use resolver::{parse_matches, resolve, resolve_range};
pub use tokenizer::{InlineContext, InlineTokenizer, TextTokenizer, skip_escape};
pub use types::{Delimiter, DelimiterKind, InlineMatch, PotentialToken, ScanRange, ScanState, TokenSource};
