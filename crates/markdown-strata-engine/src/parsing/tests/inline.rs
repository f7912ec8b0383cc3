//! Inline constructs inside full documents.

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use super::{parse_with, tree};
use crate::{options::ParserOptions, parsing::snapshot::render};

#[test]
fn hard_break_from_trailing_spaces() {
    assert_snapshot!(tree("a  \nb"), @r#"
    paragraph
      text "a"
      break
      text "b"
    "#);
}

#[test]
fn strikethrough() {
    assert_snapshot!(tree("~~gone~~"), @r#"
    paragraph
      delete
        text "gone"
    "#);
}

#[test]
fn uri_autolink() {
    assert_snapshot!(tree("<https://a.b>"), @r#"
    paragraph
      link url="https://a.b"
        text "https://a.b"
    "#);
}

#[test]
fn inline_html() {
    assert_snapshot!(tree("a <b>c</b>"), @r#"
    paragraph
      text "a "
      html "<b>"
      text "c"
      html "</b>"
    "#);
}

#[test]
fn inline_math_when_enabled() {
    let options = ParserOptions {
        math: true,
        ..ParserOptions::default()
    };
    let doc = parse_with(&options, "`$x$`");
    assert_snapshot!(render(&doc).trim_end(), @r#"
    paragraph
      inlineMath "x"
    "#);
}

#[test]
fn math_fence_is_plain_code_when_disabled() {
    let options = ParserOptions {
        math: false,
        ..ParserOptions::default()
    };
    let doc = parse_with(&options, "`$x$`");
    assert_snapshot!(render(&doc).trim_end(), @r#"
    paragraph
      inlineCode "$x$"
    "#);
}

#[test]
fn code_span_shields_emphasis() {
    let doc = super::parse("*a `*` b*");
    let emphasis = &doc.children[0].children[0];
    assert_eq!(emphasis.kind, "emphasis");
    assert_eq!(emphasis.text_content(), "a * b");
}
