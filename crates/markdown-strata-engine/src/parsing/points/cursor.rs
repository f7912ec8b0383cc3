use super::point::NodePoint;

/// A cursor for point-by-point grammar scanning.
///
/// Operates over a slice of points; `pos` is the absolute index in the
/// slice so results can be used directly as spans.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The points being scanned.
    pub points: &'a [NodePoint],
    /// Current index into `points`.
    pub i: usize,
    /// Exclusive upper bound for scanning.
    pub end: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `points[start..end]`.
    pub fn new(points: &'a [NodePoint], start: usize, end: usize) -> Self {
        Self {
            points,
            i: start,
            end: end.min(points.len()),
        }
    }

    /// Returns the current absolute index.
    pub fn pos(&self) -> usize {
        self.i
    }

    /// Returns true if at end of the scanned range.
    pub fn eof(&self) -> bool {
        self.i >= self.end
    }

    /// Peeks at the current character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Peeks `n` characters ahead of the current position.
    pub fn peek_at(&self, n: usize) -> Option<char> {
        let idx = self.i + n;
        (idx < self.end).then(|| self.points[idx].code_point)
    }

    /// Checks if the remaining input starts with the given pattern.
    pub fn starts_with(&self, pat: &str) -> bool {
        pat.chars()
            .enumerate()
            .all(|(n, c)| self.peek_at(n) == Some(c))
    }

    /// Advances by one point, returning the consumed character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += 1;
        Some(c)
    }

    /// Advances by `n` points, never past the end.
    pub fn bump_n(&mut self, n: usize) {
        self.i = (self.i + n).min(self.end);
    }

    /// Consumes characters while `pred` holds; returns how many were eaten.
    pub fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) -> usize {
        let start = self.i;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.i += 1;
        }
        self.i - start
    }

    /// Consumes spaces (including expanded tabs).
    pub fn eat_spaces(&mut self) -> usize {
        self.eat_while(|c| c == ' ')
    }

    /// Consumes spaces and at most one line ending.
    pub fn eat_optional_whitespace(&mut self) -> bool {
        self.eat_spaces();
        let newline = self.peek() == Some('\n');
        if newline {
            self.i += 1;
            self.eat_spaces();
        }
        newline
    }
}
