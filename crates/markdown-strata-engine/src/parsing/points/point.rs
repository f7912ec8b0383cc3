/// Columns between tab stops.
pub const TAB_STOP: usize = 4;

/// Marks a point as one column of an expanded tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabColumn {
    /// Column of the tab this point stands for, starting at 0.
    pub index: u8,
    /// Total number of columns the tab expanded to.
    pub width: u8,
}

/// One normalized character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePoint {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counting expanded tab columns.
    pub column: usize,
    /// Index into the flattened point array.
    pub offset: usize,
    /// Character value; a space for expanded tab columns.
    pub code_point: char,
    /// Set when the point is a virtual space produced by a tab.
    pub tab: Option<TabColumn>,
}

impl NodePoint {
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.tab.is_some()
    }
}

/// Converts source text into points.
///
/// CR LF and lone CR become a single line feed, U+0000 becomes U+FFFD and
/// tabs advance to the next multiple-of-four column.
pub fn code_points(source: &str) -> Vec<NodePoint> {
    let mut points = Vec::with_capacity(source.len());
    let mut line = 1;
    let mut column = 1;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\t' => {
                let width = TAB_STOP - (column - 1) % TAB_STOP;
                for index in 0..width {
                    points.push(NodePoint {
                        line,
                        column,
                        offset: points.len(),
                        code_point: ' ',
                        tab: Some(TabColumn {
                            index: index as u8,
                            width: width as u8,
                        }),
                    });
                    column += 1;
                }
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                points.push(NodePoint {
                    line,
                    column,
                    offset: points.len(),
                    code_point: '\n',
                    tab: None,
                });
                line += 1;
                column = 1;
            }
            c => {
                points.push(NodePoint {
                    line,
                    column,
                    offset: points.len(),
                    code_point: if c == '\0' { '\u{FFFD}' } else { c },
                    tab: None,
                });
                column += 1;
            }
        }
    }

    points
}
