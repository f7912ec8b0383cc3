use thiserror::Error;

use crate::parsing::ast::NodeKind;

/// Setup mistakes in the tokenizer configuration.
///
/// Document content never produces one of these: any input string parses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("node type `{kind}` is recognized by both `{first}` and `{second}`")]
    DuplicateType {
        kind: NodeKind,
        first: &'static str,
        second: &'static str,
    },

    #[error("tokenizers `{first}` and `{second}` share priority {priority}")]
    DuplicatePriority {
        priority: i32,
        first: &'static str,
        second: &'static str,
    },

    #[error("no registered tokenizer recognizes node type `{kind}`")]
    UnknownType { kind: NodeKind },
}
