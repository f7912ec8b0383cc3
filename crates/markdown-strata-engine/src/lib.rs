//! # markdown-strata engine
//!
//! An extensible CommonMark/GFM parser built as a two-stage tokenizing
//! pipeline: block structure first, then inline structure inside every
//! text-bearing leaf.
//!
//! ```
//! use markdown_strata_engine::{Parser, ParserOptions};
//!
//! let parser = Parser::with_options(&ParserOptions::default()).unwrap();
//! let doc = parser.parse("# Hello").unwrap();
//! assert_eq!(doc.children[0].kind, "heading");
//! ```

pub mod error;
pub mod options;
pub mod parsing;

pub use error::ConfigError;
pub use options::{GfmOptions, ParserOptions};
pub use parsing::ast::{Definition, Document, Node, NodeData, NodeKind, Point, Position};
pub use parsing::parser::{Parser, ParserBuilder, parse};
pub use parsing::registry::Phases;
