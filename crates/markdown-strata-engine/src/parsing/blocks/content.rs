//! Text-bearing content of leaf blocks.
//!
//! Leaves buffer the lines they consume as [`PhrasingLine`]s; at parse time
//! those become a [`PhrasingContent`], a contiguous run of points handed to
//! inline resolution. Points keep their original positions, so inline nodes
//! map back onto the source even though container prefixes are gone.

use crate::parsing::points::{EatingLine, LineRange, NodePoint, Span};

/// One line of phrasing content with its container prefixes removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhrasingLine {
    pub start: usize,
    /// Exclusive end, including the line feed.
    pub end: usize,
    pub first_non_whitespace: usize,
}

impl PhrasingLine {
    pub fn from_eating(line: &EatingLine<'_>) -> Self {
        Self {
            start: line.start_index,
            end: line.end_index,
            first_non_whitespace: line.first_non_whitespace_index,
        }
    }

    pub fn from_range(points: &[NodePoint], range: LineRange) -> Self {
        let mut fnw = range.start;
        while fnw < range.end && points[fnw].code_point == ' ' {
            fnw += 1;
        }
        Self {
            start: range.start,
            end: range.end,
            first_non_whitespace: fnw,
        }
    }

    pub fn range(&self) -> LineRange {
        LineRange {
            start: self.start,
            end: self.end,
        }
    }
}

/// Buffered lines of a paragraph-like leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhrasingState {
    pub lines: Vec<PhrasingLine>,
}

impl PhrasingState {
    pub fn span(&self) -> Option<Span> {
        Some(Span::new(self.lines.first()?.start, self.lines.last()?.end))
    }
}

/// Points ready for inline resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhrasingContent {
    pub points: Vec<NodePoint>,
}

impl PhrasingContent {
    /// Joins lines, dropping each line's indentation and the trailing
    /// whitespace of the whole run.
    pub fn from_lines(points: &[NodePoint], lines: &[PhrasingLine]) -> Self {
        let mut out = Vec::new();
        for line in lines {
            let end = line.end.min(points.len());
            if line.first_non_whitespace < end {
                out.extend_from_slice(&points[line.first_non_whitespace..end]);
            }
        }
        trim_end(&mut out);
        Self { points: out }
    }

    /// Content of a single span with whitespace trimmed at both ends.
    pub fn from_span(points: &[NodePoint], span: Span) -> Self {
        let end = span.end.min(points.len());
        let mut start = span.start.min(end);
        while start < end && matches!(points[start].code_point, ' ' | '\n') {
            start += 1;
        }
        let mut out = points[start..end].to_vec();
        trim_end(&mut out);
        Self { points: out }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn text(&self) -> String {
        self.points.iter().map(|p| p.code_point).collect()
    }
}

fn trim_end(points: &mut Vec<NodePoint>) {
    while points
        .last()
        .is_some_and(|p| matches!(p.code_point, ' ' | '\n'))
    {
        points.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::{code_points, lines};

    fn phrasing(points: &[NodePoint]) -> Vec<PhrasingLine> {
        lines(points, 0, points.len())
            .into_iter()
            .map(|r| PhrasingLine::from_range(points, r))
            .collect()
    }

    #[test]
    fn joins_lines_without_indentation() {
        let points = code_points("  foo\n   bar  \n");
        let content = PhrasingContent::from_lines(&points, &phrasing(&points));
        assert_eq!(content.text(), "foo\nbar");
    }

    #[test]
    fn keeps_original_offsets() {
        let points = code_points("  foo");
        let content = PhrasingContent::from_lines(&points, &phrasing(&points));
        assert_eq!(content.points[0].offset, 2);
        assert_eq!(content.points[0].column, 3);
    }

    #[test]
    fn span_content_is_trimmed() {
        let points = code_points("#   Hello  ");
        let content = PhrasingContent::from_span(&points, Span::new(1, points.len()));
        assert_eq!(content.text(), "Hello");
    }

    #[test]
    fn blank_span_is_empty() {
        let points = code_points("#   ");
        assert!(PhrasingContent::from_span(&points, Span::new(1, 4)).is_empty());
    }

    #[test]
    fn state_span_covers_lines() {
        let points = code_points("a\nb\n");
        let state = PhrasingState {
            lines: phrasing(&points),
        };
        assert_eq!(state.span(), Some(Span::new(0, 4)));
    }
}
