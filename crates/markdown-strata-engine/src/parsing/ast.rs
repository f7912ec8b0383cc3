//! Output tree: nodes, positions, definitions and the document.
//!
//! Node kinds are plain strings so third-party tokenizers can introduce
//! their own without touching this module.

use std::collections::BTreeMap;

use serde::Serialize;

use super::points::NodePoint;

/// Name of a node type, e.g. `"paragraph"`.
pub type NodeKind = &'static str;

pub const ROOT: NodeKind = "root";
pub const PARAGRAPH: NodeKind = "paragraph";
pub const HEADING: NodeKind = "heading";
pub const THEMATIC_BREAK: NodeKind = "thematicBreak";
pub const BLOCKQUOTE: NodeKind = "blockquote";
pub const LIST: NodeKind = "list";
pub const LIST_ITEM: NodeKind = "listItem";
pub const CODE: NodeKind = "code";
pub const TABLE: NodeKind = "table";
pub const TABLE_ROW: NodeKind = "tableRow";
pub const TABLE_CELL: NodeKind = "tableCell";
pub const DEFINITION: NodeKind = "definition";
pub const TEXT: NodeKind = "text";
pub const EMPHASIS: NodeKind = "emphasis";
pub const STRONG: NodeKind = "strong";
pub const DELETE: NodeKind = "delete";
pub const INLINE_CODE: NodeKind = "inlineCode";
pub const INLINE_MATH: NodeKind = "inlineMath";
pub const BREAK: NodeKind = "break";
pub const LINK: NodeKind = "link";
pub const IMAGE: NodeKind = "image";
pub const LINK_REFERENCE: NodeKind = "linkReference";
pub const IMAGE_REFERENCE: NodeKind = "imageReference";
pub const HTML: NodeKind = "html";

/// A location in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl From<&NodePoint> for Point {
    fn from(p: &NodePoint) -> Self {
        Self {
            line: p.line,
            column: p.column,
            offset: p.offset,
        }
    }
}

/// Start (inclusive) and end (exclusive) of a node in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub start: Point,
    pub end: Point,
}

impl Position {
    /// Position of `points[start..end]`.
    ///
    /// The end point is the one just past the last covered point; after a
    /// line feed that is the first column of the next line.
    pub fn from_points(points: &[NodePoint], start: usize, end: usize) -> Option<Self> {
        let first = points.get(start)?;
        if end <= start {
            let p = Point::from(first);
            return Some(Self { start: p, end: p });
        }
        let last = points.get(end - 1)?;
        let end_point = if last.code_point == '\n' {
            Point {
                line: last.line + 1,
                column: 1,
                offset: last.offset + 1,
            }
        } else {
            Point {
                line: last.line,
                column: last.column + 1,
                offset: last.offset + 1,
            }
        };
        Some(Self {
            start: Point::from(first),
            end: end_point,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceType {
    Full,
    Collapsed,
    Shortcut,
}

impl ReferenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReferenceType::Full => "full",
            ReferenceType::Collapsed => "collapsed",
            ReferenceType::Shortcut => "shortcut",
        }
    }
}

/// Type-specific fields of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(untagged)]
pub enum NodeData {
    #[default]
    None,
    Heading {
        depth: u8,
    },
    Code {
        lang: Option<String>,
        meta: Option<String>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        spread: bool,
        marker: char,
    },
    ListItem {
        spread: bool,
        checked: Option<bool>,
    },
    Table {
        align: Vec<Align>,
    },
    Link {
        url: String,
        title: Option<String>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
    Reference {
        identifier: String,
        label: String,
        #[serde(rename = "referenceType")]
        reference_type: ReferenceType,
    },
    ImageReference {
        identifier: String,
        label: String,
        #[serde(rename = "referenceType")]
        reference_type: ReferenceType,
        alt: String,
    },
}

impl NodeData {
    pub fn is_none(&self) -> bool {
        matches!(self, NodeData::None)
    }
}

/// A parsed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Type-specific fields, serialized inline next to `type`.
    #[serde(flatten)]
    pub data: NodeData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            data: NodeData::None,
            value: None,
            children: Vec::new(),
            position: None,
        }
    }

    /// A leaf carrying a literal value (text, code, html...).
    pub fn literal(kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new(kind)
        }
    }

    pub fn parent(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            children,
            ..Self::new(kind)
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Option<Position>) -> Self {
        self.position = position;
        self
    }

    /// Concatenated values of all descendant leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(value) = &self.value {
            out.push_str(value);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}

/// A link reference definition, stored in `Document::meta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Definition {
    /// Normalized label used as the map key.
    pub identifier: String,
    /// Label as written.
    pub label: String,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// The result of a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Document {
    pub meta: BTreeMap<String, Definition>,
    pub children: Vec<Node>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty() && self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::points::code_points;
    use serde_json::json;

    #[test]
    fn position_ends_after_last_point() {
        let points = code_points("ab\ncd");
        let pos = Position::from_points(&points, 0, 2).unwrap();
        assert_eq!(pos.start, Point { line: 1, column: 1, offset: 0 });
        assert_eq!(pos.end, Point { line: 1, column: 3, offset: 2 });
    }

    #[test]
    fn position_after_line_feed_moves_to_next_line() {
        let points = code_points("ab\ncd");
        let pos = Position::from_points(&points, 0, 3).unwrap();
        assert_eq!(pos.end, Point { line: 2, column: 1, offset: 3 });
    }

    #[test]
    fn position_out_of_range_is_none() {
        let points = code_points("a");
        assert!(Position::from_points(&points, 3, 4).is_none());
    }

    #[test]
    fn data_fields_sit_next_to_type() {
        let heading = Node::parent(HEADING, vec![Node::literal(TEXT, "Hi")])
            .with_data(NodeData::Heading { depth: 1 });
        let json = serde_json::to_string(&heading).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "heading",
                "depth": 1,
                "children": [{ "type": "text", "value": "Hi" }]
            })
        );
    }

    #[test]
    fn parsed_reference_serializes_flat() {
        let doc = crate::parsing::parser::Parser::builder()
            .use_inline(crate::parsing::inline::kinds::Link::default())
            .use_block(crate::parsing::blocks::kinds::LinkDefinition::default())
            .with_position(false)
            .build()
            .unwrap()
            .parse("[Foo]: /url \"t\"\n\n[foo][]")
            .unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "meta": {
                    "foo": {
                        "identifier": "foo",
                        "label": "Foo",
                        "destination": "/url",
                        "title": "t"
                    }
                },
                "children": [{
                    "type": "paragraph",
                    "children": [{
                        "type": "linkReference",
                        "identifier": "foo",
                        "label": "foo",
                        "referenceType": "collapsed",
                        "children": [{ "type": "text", "value": "foo" }]
                    }]
                }]
            })
        );
    }

    #[test]
    fn text_content_concatenates_leaves() {
        let node = Node::parent(
            EMPHASIS,
            vec![
                Node::literal(TEXT, "a"),
                Node::parent(STRONG, vec![Node::literal(TEXT, "b")]),
            ],
        );
        assert_eq!(node.text_content(), "ab");
    }
}
