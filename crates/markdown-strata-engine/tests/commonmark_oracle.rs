//! Cross-checks construct counts against pulldown-cmark on documents
//! where both parsers must agree.

use markdown_strata_engine::{GfmOptions, Node, Parser, ParserOptions};
use pretty_assertions::assert_eq;
use pulldown_cmark::{Event, Tag};
use rstest::rstest;

#[derive(Debug, Default, PartialEq, Eq)]
struct Counts {
    headings: usize,
    emphasis: usize,
    strong: usize,
    links: usize,
    code_spans: usize,
    thematic_breaks: usize,
    block_quotes: usize,
}

fn oracle_counts(md: &str) -> Counts {
    let mut counts = Counts::default();
    for event in pulldown_cmark::Parser::new(md) {
        match event {
            Event::Start(Tag::Heading { .. }) => counts.headings += 1,
            Event::Start(Tag::Emphasis) => counts.emphasis += 1,
            Event::Start(Tag::Strong) => counts.strong += 1,
            Event::Start(Tag::Link { .. }) => counts.links += 1,
            Event::Start(Tag::BlockQuote(_)) => counts.block_quotes += 1,
            Event::Code(_) => counts.code_spans += 1,
            Event::Rule => counts.thematic_breaks += 1,
            _ => {}
        }
    }
    counts
}

fn tally(node: &Node, counts: &mut Counts) {
    match node.kind {
        "heading" => counts.headings += 1,
        "emphasis" => counts.emphasis += 1,
        "strong" => counts.strong += 1,
        "link" | "linkReference" => counts.links += 1,
        "inlineCode" => counts.code_spans += 1,
        "thematicBreak" => counts.thematic_breaks += 1,
        "blockquote" => counts.block_quotes += 1,
        _ => {}
    }
    for child in &node.children {
        tally(child, counts);
    }
}

fn strata_counts(md: &str) -> Counts {
    let options = ParserOptions {
        gfm: GfmOptions::disabled(),
        ..ParserOptions::default()
    };
    let doc = Parser::with_options(&options).unwrap().parse(md).unwrap();
    let mut counts = Counts::default();
    for node in &doc.children {
        tally(node, &mut counts);
    }
    counts
}

#[rstest]
#[case::atx_headings("# A\n\n## B\n")]
#[case::setext_heading("Bar\n===\n")]
#[case::emphasis_and_strong("*a* and **b** and ***c***")]
#[case::underscores("_a_ __b__")]
#[case::code_spans("`code` and ``more ` here``")]
#[case::thematic_breaks("---\n\n***\n\n___\n")]
#[case::nested_quotes("> quote\n> > nested\n")]
#[case::inline_link_and_autolink("[a](/b) and <https://c.d>")]
#[case::reference_link("[x]\n\n[x]: /y")]
#[case::list_with_inlines("- *a*\n- `b`\n")]
#[case::code_block_hides_inlines("    *not* `code`\n")]
fn agrees_with_pulldown_cmark(#[case] md: &str) {
    assert_eq!(strata_counts(md), oracle_counts(md));
}
