//! # Parsing
//!
//! Source text flows through these stages:
//!
//! 1. **points**: text becomes position-annotated code points, split into lines
//! 2. **blocks**: the block engine matches lines into a tree of block states,
//!    then post-match hooks run and states are parsed into raw nodes
//! 3. meta results (link reference definitions) are gathered into the
//!    document metadata map, first definition winning
//! 4. **inline**: every phrasing run is resolved into inline nodes against
//!    that map
//! 5. post-parse hooks adjust the finished tree
//!
//! Tokenizers are registered once on a [`parser::ParserBuilder`]; the
//! resulting [`parser::Parser`] is immutable and may parse any number of
//! documents.

pub mod ast;
pub mod blocks;
pub mod inline;
pub mod parser;
pub mod points;
pub mod registry;
pub mod snapshot;

#[cfg(test)]
mod tests;
