//! Character classes for flanking and whitespace rules.

/// Unicode whitespace as used by delimiter-run flanking.
#[must_use]
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{000C}' | '\r') || c.is_whitespace()
}

/// Space or tab, the only indentation characters.
#[must_use]
pub fn is_space_or_tab(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Punctuation or symbol: ASCII punctuation, plus any non-ASCII character
/// that is neither alphanumeric nor whitespace.
#[must_use]
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_ascii() && !c.is_whitespace() && !c.is_alphanumeric())
}

/// Characters a backslash may escape.
#[must_use]
pub fn is_escapable(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// `None` stands for the edge of the text, which counts as whitespace.
#[must_use]
pub fn is_whitespace_or_edge(c: Option<char>) -> bool {
    c.is_none_or(is_whitespace)
}
