use super::point::NodePoint;

/// One physical line: `[start, end)` including its line feed, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

/// Splits `points[start..end]` into physical lines.
///
/// Each line keeps its trailing line feed; the final line may lack one.
pub fn lines(points: &[NodePoint], start: usize, end: usize) -> Vec<LineRange> {
    let end = end.min(points.len());
    let mut out = Vec::new();
    let mut line_start = start;
    for i in start..end {
        if points[i].code_point == '\n' {
            out.push(LineRange {
                start: line_start,
                end: i + 1,
            });
            line_start = i + 1;
        }
    }
    if line_start < end {
        out.push(LineRange {
            start: line_start,
            end,
        });
    }
    out
}

/// The unconsumed tail of a line as seen by a block tokenizer.
///
/// Container tokenizers advance `start_index` past their prefixes; the
/// first non-whitespace index is recomputed on every advance.
#[derive(Debug, Clone, Copy)]
pub struct EatingLine<'a> {
    pub points: &'a [NodePoint],
    /// 1-based line number.
    pub line_no: usize,
    /// First unconsumed point.
    pub start_index: usize,
    /// Exclusive end, including the line feed.
    pub end_index: usize,
    /// First point at or after `start_index` that is not a space.
    /// May equal the line feed or `end_index`.
    pub first_non_whitespace_index: usize,
}

impl<'a> EatingLine<'a> {
    pub fn new(points: &'a [NodePoint], range: LineRange) -> Self {
        let line_no = points.get(range.start).map_or(1, |p| p.line);
        let mut line = Self {
            points,
            line_no,
            start_index: range.start,
            end_index: range.end,
            first_non_whitespace_index: range.start,
        };
        line.advance_to(range.start);
        line
    }

    /// Moves the consumed boundary forward (never backward).
    pub fn advance_to(&mut self, index: usize) {
        self.start_index = index.clamp(self.start_index, self.end_index);
        let mut fnw = self.start_index;
        while fnw < self.end_index && self.points[fnw].code_point == ' ' {
            fnw += 1;
        }
        self.first_non_whitespace_index = fnw;
    }

    /// Returns a copy advanced to `index`.
    #[must_use]
    pub fn advanced(mut self, index: usize) -> Self {
        self.advance_to(index);
        self
    }

    /// True when nothing but spaces and the line feed remain.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.first_non_whitespace_index >= self.end_index
            || self.points[self.first_non_whitespace_index].code_point == '\n'
    }

    /// True when the line has been consumed entirely.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.start_index >= self.end_index
    }

    /// Columns of indentation before the first non-whitespace point.
    #[must_use]
    pub fn preceding_space_count(&self) -> usize {
        self.first_non_whitespace_index - self.start_index
    }

    /// End of the line content, excluding the line feed.
    #[must_use]
    pub fn content_end(&self) -> usize {
        if self.end_index > self.start_index
            && self.points[self.end_index - 1].code_point == '\n'
        {
            self.end_index - 1
        } else {
            self.end_index
        }
    }

    /// End of the last non-space point, or the first non-whitespace index
    /// when the line is blank.
    #[must_use]
    pub fn trimmed_end(&self) -> usize {
        let mut end = self.content_end();
        while end > self.first_non_whitespace_index && self.points[end - 1].code_point == ' ' {
            end -= 1;
        }
        end.max(self.first_non_whitespace_index)
    }

    /// Character at `index`, if it lies inside the line.
    #[must_use]
    pub fn char_at(&self, index: usize) -> Option<char> {
        (index < self.end_index).then(|| self.points[index].code_point)
    }

    /// The first non-whitespace character, unless the line is blank.
    #[must_use]
    pub fn first_char(&self) -> Option<char> {
        if self.is_blank() {
            None
        } else {
            self.char_at(self.first_non_whitespace_index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::code_points;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_keeping_line_feeds() {
        let points = code_points("a\nbb\n\nc");
        let ranges = lines(&points, 0, points.len());
        assert_eq!(
            ranges,
            vec![
                LineRange { start: 0, end: 2 },
                LineRange { start: 2, end: 5 },
                LineRange { start: 5, end: 6 },
                LineRange { start: 6, end: 7 },
            ]
        );
    }

    #[test]
    fn trailing_newline_makes_no_empty_line() {
        let points = code_points("a\n");
        assert_eq!(lines(&points, 0, points.len()).len(), 1);
    }

    #[test]
    fn eating_line_indentation() {
        let points = code_points("   ***\n");
        let line = EatingLine::new(&points, LineRange { start: 0, end: 7 });
        assert_eq!(line.preceding_space_count(), 3);
        assert_eq!(line.first_char(), Some('*'));
        assert_eq!(line.content_end(), 6);
        assert_eq!(line.trimmed_end(), 6);
        assert!(!line.is_blank());
    }

    #[test]
    fn tab_counts_as_four_columns_of_indent() {
        let points = code_points("\tcode");
        let line = EatingLine::new(&points, LineRange { start: 0, end: points.len() });
        assert_eq!(line.preceding_space_count(), 4);
    }

    #[test]
    fn blank_lines() {
        let points = code_points("   \n");
        let line = EatingLine::new(&points, LineRange { start: 0, end: 4 });
        assert!(line.is_blank());
        assert_eq!(line.first_char(), None);
    }

    #[test]
    fn advance_recomputes_first_non_whitespace() {
        let points = code_points(">  quote");
        let line = EatingLine::new(&points, LineRange { start: 0, end: points.len() });
        let inner = line.advanced(1);
        assert_eq!(inner.start_index, 1);
        assert_eq!(inner.first_non_whitespace_index, 3);
        assert_eq!(inner.advanced(0).start_index, 1);
    }
}
