//! Concrete inline grammars, each built only on the public tokenizer
//! interface.

mod autolink;
mod code_span;
mod delete;
pub mod destination;
mod emphasis;
mod html;
mod line_break;
mod link;
mod math;
mod text;

pub use autolink::{AUTOLINK, Autolink};
pub use code_span::InlineCode;
pub use delete::Delete;
pub use emphasis::Emphasis;
pub use html::InlineHtml;
pub use line_break::LineBreak;
pub use link::{Image, Link};
pub use math::InlineMath;
pub use text::Text;
