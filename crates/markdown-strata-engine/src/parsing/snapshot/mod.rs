//! # Snapshot Testing Support
//!
//! Utilities for testing the parser via snapshot assertions and invariant checks.
//!
//! ## Modules
//!
//! - **`render`**: Dumps a `Document` as a stable, indented text tree for
//!   `insta` inline snapshots
//! - **`invariants`**: Runtime checks for parser correctness (positions in
//!   bounds, children ordered and contained in parents, no link inside a link)
//!
//! ## Testing Strategy
//!
//! Parsing behavior is pinned by snapshots of whole documents rather than by
//! asserting on individual fields, so a change in tree shape shows up as one
//! readable diff.

pub mod invariants;
pub mod render;

pub use invariants::check as invariants;
pub use render::render;
