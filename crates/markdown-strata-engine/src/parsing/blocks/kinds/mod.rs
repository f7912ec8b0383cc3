//! Bundled block grammars.

mod block_quote;
mod code_fence;
mod heading;
mod html_block;
mod indented_code;
mod link_definition;
mod list;
mod paragraph;
mod setext_heading;
mod table;
mod thematic_break;

pub use block_quote::BlockQuote;
pub use code_fence::{FenceKind, FencedCode};
pub use heading::AtxHeading;
pub use html_block::HtmlBlock;
pub use indented_code::IndentedCode;
pub use link_definition::LinkDefinition;
pub use list::ListItem;
pub use paragraph::Paragraph;
pub use setext_heading::SetextHeading;
pub use table::Table;
pub use thematic_break::ThematicBreak;
