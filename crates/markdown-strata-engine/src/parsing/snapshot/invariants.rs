use crate::parsing::ast::{Document, LINK, LINK_REFERENCE, Node, Position};

/// Validates parser output invariants.
///
/// Asserts that:
/// - Every position lies within `source_len` code points and starts before it ends
/// - Siblings are in source order and do not overlap
/// - Children lie inside their parent
/// - No link contains another link
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(source_len: usize, doc: &Document) {
    check_siblings(&doc.children, None, source_len, false);
}

fn check_siblings(nodes: &[Node], parent: Option<Position>, source_len: usize, in_link: bool) {
    let mut previous_end: Option<usize> = None;
    for node in nodes {
        let is_link = matches!(node.kind, LINK | LINK_REFERENCE);
        assert!(
            !(in_link && is_link),
            "link nested inside another link: {node:?}"
        );
        if let Some(position) = node.position {
            let (start, end) = (position.start.offset, position.end.offset);
            assert!(
                start <= end && end <= source_len,
                "position out of bounds: {position:?} (source len: {source_len})"
            );
            if let Some(parent) = parent {
                assert!(
                    parent.start.offset <= start && end <= parent.end.offset,
                    "child {position:?} not contained in parent {parent:?}"
                );
            }
            if let Some(previous_end) = previous_end {
                assert!(
                    previous_end <= start,
                    "sibling starting at {start} overlaps previous ending at {previous_end}"
                );
            }
            previous_end = Some(end);
        }
        check_siblings(
            &node.children,
            node.position.or(parent),
            source_len,
            in_link || is_link,
        );
    }
}
