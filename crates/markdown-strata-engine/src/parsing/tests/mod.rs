//! Integration tests for the parsing module.
//!
//! Whole documents go through the default parser; trees are compared as
//! `insta` inline snapshots of the rendered tree, and every result is run
//! through the invariant checks.

mod inline;

use std::time::{Duration, Instant};

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use crate::{
    options::{DEFAULT_MAX_NESTING, ParserOptions},
    parsing::{
        ast::{BLOCKQUOTE, Document, HEADING, Node, PARAGRAPH, Point},
        parser::Parser,
        points::code_points,
        snapshot::{invariants, render},
    },
};

pub(super) fn parse_with(options: &ParserOptions, md: &str) -> Document {
    let parser = Parser::with_options(options).unwrap();
    let doc = parser.parse(md).unwrap();
    invariants(code_points(md).len(), &doc);
    doc
}

pub(super) fn parse(md: &str) -> Document {
    parse_with(&ParserOptions::default(), md)
}

pub(super) fn tree(md: &str) -> String {
    render(&parse(md)).trim_end().to_string()
}

#[test]
fn atx_heading() {
    assert_snapshot!(tree("# Hello"), @r#"
    heading depth=1
      text "Hello"
    "#);
}

#[test]
fn atx_heading_positions() {
    let doc = parse("# Hello");
    let heading = &doc.children[0];
    assert_eq!(heading.kind, HEADING);
    let position = heading.position.unwrap();
    assert_eq!(position.start, Point { line: 1, column: 1, offset: 0 });
    assert_eq!(position.end, Point { line: 1, column: 8, offset: 7 });
    let text = heading.children[0].position.unwrap();
    assert_eq!(text.start, Point { line: 1, column: 3, offset: 2 });
    assert_eq!(text.end, Point { line: 1, column: 8, offset: 7 });
}

#[test]
fn setext_heading() {
    assert_snapshot!(tree("Foo\n===\n"), @r#"
    heading depth=1
      text "Foo"
    "#);
}

#[test]
fn emphasis() {
    assert_snapshot!(tree("*a*"), @r#"
    paragraph
      emphasis
        text "a"
    "#);
}

#[test]
fn emphasis_wraps_strong() {
    assert_snapshot!(tree("***a***"), @r#"
    paragraph
      emphasis
        strong
          text "a"
    "#);
}

#[test]
fn reference_definition_resolves_link() {
    let doc = parse("[foo]: /url \"t\"\n\n[foo]");
    let definition = &doc.meta["foo"];
    assert_eq!(definition.destination, "/url");
    assert_eq!(definition.title.as_deref(), Some("t"));
    assert_snapshot!(render(&doc).trim_end(), @r#"
    definition "foo" -> "/url" title="t"
    paragraph
      linkReference identifier="foo" type=shortcut
        text "foo"
    "#);
}

#[test]
fn first_definition_wins() {
    let doc = parse("[a]: /one\n[A]: /two\n\n[a]");
    assert_eq!(doc.meta.len(), 1);
    assert_eq!(doc.meta["a"].destination, "/one");
}

#[test]
fn thematic_break_up_to_three_spaces() {
    assert_snapshot!(tree("   ***"), @"thematicBreak");
}

#[test]
fn four_spaces_make_indented_code() {
    assert_snapshot!(tree("    ***"), @r#"code "***""#);
}

#[test]
fn block_quote_lazy_continuation() {
    assert_snapshot!(tree("> a\nb"), @r#"
    blockquote
      paragraph
        text "a\nb"
    "#);
}

#[test]
fn fenced_code_with_info() {
    assert_snapshot!(tree("```rust title\nfn main() {}\n```"), @r#"code lang="rust" meta="title" "fn main() {}""#);
}

#[test]
fn html_block_keeps_markdown_verbatim() {
    assert_snapshot!(tree("<div>\n*a*\n</div>"), @r#"html "<div>\n*a*\n</div>""#);
}

#[test]
fn raw_html_block_ends_at_closing_tag() {
    assert_snapshot!(tree("<pre>\n# x\n\n</pre>\nafter"), @r#"
    html "<pre>\n# x\n\n</pre>"
    paragraph
      text "after"
    "#);
}

#[test]
fn html_block_interrupts_paragraph_unless_complete_tag() {
    assert_snapshot!(tree("a\n<div>\n\nb\n<span>"), @r#"
    paragraph
      text "a"
    html "<div>"
    paragraph
      text "b\n"
      html "<span>"
    "#);
}

#[test]
fn html_blocks_follow_the_html_option() {
    let options = ParserOptions {
        html: false,
        ..ParserOptions::default()
    };
    let doc = parse_with(&options, "<!-- c -->");
    assert_eq!(doc.children[0].kind, PARAGRAPH);
}

#[test]
fn tight_bullet_list() {
    assert_snapshot!(tree("- a\n- b"), @r#"
    list ordered=false spread=false marker='-'
      listItem spread=false
        paragraph
          text "a"
      listItem spread=false
        paragraph
          text "b"
    "#);
}

#[test]
fn task_list_item() {
    assert_snapshot!(tree("- [x] done"), @r#"
    list ordered=false spread=false marker='-'
      listItem spread=false checked=true
        paragraph
          text "done"
    "#);
}

#[test]
fn escaped_or_encoded_brackets_are_not_checkboxes() {
    assert_snapshot!(tree("- \\[x] done"), @r#"
    list ordered=false spread=false marker='-'
      listItem spread=false
        paragraph
          text "[x] done"
    "#);
    assert_snapshot!(tree("- &#91;x] done"), @r#"
    list ordered=false spread=false marker='-'
      listItem spread=false
        paragraph
          text "[x] done"
    "#);
}

#[test]
fn checkbox_wins_over_a_matching_definition() {
    assert_snapshot!(tree("- [x] done\n\n[x]: /u"), @r#"
    definition "x" -> "/u"
    list ordered=false spread=false marker='-'
      listItem spread=false checked=true
        paragraph
          text "done"
    "#);
}

#[test]
fn checkbox_needs_whitespace_and_text() {
    assert_snapshot!(tree("- [ ]done\n- [x]"), @r#"
    list ordered=false spread=false marker='-'
      listItem spread=false
        paragraph
          text "[ ]done"
      listItem spread=false
        paragraph
          text "[x]"
    "#);
}

#[test]
fn task_text_position_after_tab() {
    let doc = parse("- [x]\tdone");
    let item = &doc.children[0].children[0];
    assert_eq!(item.text_content(), "done");
    let text = item.children[0].children[0].position.unwrap();
    assert_eq!(text.start, Point { line: 1, column: 9, offset: 8 });
}

#[test]
fn task_list_can_be_disabled() {
    let mut options = ParserOptions::default();
    options.gfm.task_list = false;
    let doc = parse_with(&options, "- [x] done");
    assert_eq!(doc.children[0].children[0].text_content(), "[x] done");
}

#[test]
fn gfm_table() {
    assert_snapshot!(tree("| a | b |\n| :- | -: |\n| 1 | 2 |"), @r#"
    table align=[left,right]
      tableRow
        tableCell
          text "a"
        tableCell
          text "b"
      tableRow
        tableCell
          text "1"
        tableCell
          text "2"
    "#);
}

#[test]
fn tables_can_be_disabled() {
    let mut options = ParserOptions::default();
    options.gfm.table = false;
    let doc = parse_with(&options, "| a |\n| - |");
    assert_eq!(doc.children[0].kind, "paragraph");
}

#[test]
fn empty_document() {
    let doc = parse("");
    assert!(doc.is_empty());
}

#[test]
fn blank_lines_only() {
    let doc = parse("\n\n\n");
    assert!(doc.children.is_empty());
}

fn depth(nodes: &[Node]) -> usize {
    nodes.iter().map(|n| 1 + depth(&n.children)).max().unwrap_or(0)
}

/// Deep delimiter nesting is cut off at the nesting limit instead of
/// recursing once per delimiter pair.
#[test]
fn deep_emphasis_nesting_is_bounded() {
    let md = format!("{}a{}", "*".repeat(5000), "*".repeat(5000));
    let started = Instant::now();
    let doc = parse(&md);
    assert!(started.elapsed() < Duration::from_secs(10));

    assert!(depth(&doc.children) <= DEFAULT_MAX_NESTING + 2);
    let text = doc.children[0].text_content();
    assert_eq!(text.matches('a').count(), 1);
    assert!(text.starts_with('*'));
}

#[test]
fn deep_block_quote_nesting_is_bounded() {
    let md = format!("{} a", ">".repeat(20_000));
    let doc = parse(&md);

    assert_eq!(doc.children[0].kind, BLOCKQUOTE);
    assert!(depth(&doc.children) <= DEFAULT_MAX_NESTING + 2);
    assert!(doc.children[0].text_content().ends_with("> a"));
}

#[test]
fn nesting_limit_is_configurable() {
    let options = ParserOptions {
        max_nesting: 1,
        ..ParserOptions::default()
    };
    let doc = parse_with(&options, "> > *a*");
    assert_snapshot!(render(&doc).trim_end(), @r#"
    blockquote
      paragraph
        text "> "
        emphasis
          text "a"
    "#);
}

/// Any input parses, and the result keeps the structural invariants.
#[test]
fn parsing_is_total() {
    let inputs = [
        "",
        "\t\tfoo",
        "> > >",
        "*_*_",
        "[[[]]]",
        "```",
        "- \n-",
        "\r\n\r\n",
        "\0",
        "|a|\n|-|",
        "[x]: <>\n[x]",
        "1. a\n\n   b\n2. c",
        "***\n---\n___",
        "a\n===\n---",
        "> - a\n>   b\nc",
        "`` ` ``  \\\n**x*y**z*",
        "[a](<b) c>) ![d](e \"f",
        "<a href=\"x\">y</a> <http://z>",
    ];
    for input in inputs {
        parse(input);
    }
}
