use serde::{Deserialize, Serialize};

/// Container and inline nesting depth honored by default.
pub const DEFAULT_MAX_NESTING: usize = 64;

/// Switches for the default tokenizer set.
///
/// Every field has a default, so a partial TOML table is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Attach `position` to every produced node.
    pub position: bool,
    pub gfm: GfmOptions,
    /// Inline math written as `` `$x$` ``.
    pub math: bool,
    /// Raw HTML blocks and inline HTML.
    pub html: bool,
    /// Deepest block container or inline token nesting that is parsed.
    /// Content nested deeper is kept as paragraph text.
    pub max_nesting: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            position: true,
            gfm: GfmOptions::default(),
            math: false,
            html: true,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// GitHub Flavored Markdown extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GfmOptions {
    pub strikethrough: bool,
    pub table: bool,
    pub task_list: bool,
}

impl Default for GfmOptions {
    fn default() -> Self {
        Self {
            strikethrough: true,
            table: true,
            task_list: true,
        }
    }
}

impl GfmOptions {
    /// Plain CommonMark: every extension off.
    pub fn disabled() -> Self {
        Self {
            strikethrough: false,
            table: false,
            task_list: false,
        }
    }
}
