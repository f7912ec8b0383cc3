//! # Code Points
//!
//! The lowest layer of the pipeline: source text becomes a flat array of
//! position-annotated points, and every later phase addresses text by index
//! into that array.
//!
//! ## Modules
//!
//! - **`point`**: `NodePoint` and the `code_points` stream (tab expansion, line ending normalization)
//! - **`lines`**: line segmentation and the `EatingLine` descriptor handed to block tokenizers
//! - **`span`**: `Span`, a half-open index range
//! - **`cursor`**: `Cursor` for grammar scanning over points
//! - **`chars`**: whitespace / punctuation classes used by flanking rules
//! - **`text`**: literal reproduction, escapes, character references, label normalization
//!
//! ## Key Invariants
//!
//! - `points[i].offset == i` for a stream produced by `code_points`
//! - A tab never survives as a point: it becomes 1-4 virtual spaces
//! - Every line ends with a line feed point except possibly the last

pub mod chars;
pub mod cursor;
pub mod lines;
pub mod point;
pub mod span;
pub mod text;

pub use cursor::Cursor;
pub use lines::{EatingLine, LineRange, lines};
pub use point::{NodePoint, TAB_STOP, TabColumn, code_points};
pub use span::Span;
