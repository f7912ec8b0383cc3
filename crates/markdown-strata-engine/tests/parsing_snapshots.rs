use insta::assert_snapshot;
use markdown_strata_engine::{
    parse,
    parsing::{points::code_points, snapshot},
};

fn render_fixture(name: &str) -> String {
    let md = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();

    let doc = parse(&md).unwrap();
    snapshot::invariants(code_points(&md).len(), &doc);

    snapshot::render(&doc).trim_end().to_string()
}

#[test]
fn fixture_simple_paragraph() {
    assert_snapshot!(render_fixture("combos/simple_paragraph"), @r#"
    paragraph
      text "Hello "
      emphasis
        text "world"
      text " and "
      strong
        text "friends"
      text "."
    "#);
}

#[test]
fn fixture_nested_quote_fence() {
    assert_snapshot!(render_fixture("combos/nested_quote_fence"), @r#"
    blockquote
      code "code"
    "#);
}

#[test]
fn fixture_reference_links() {
    assert_snapshot!(render_fixture("combos/reference_links"), @r#"
    definition "ref" -> "https://example.com" title="Example"
    paragraph
      linkReference identifier="ref" type=full
        text "Full"
      text ", "
      linkReference identifier="ref" type=collapsed
        text "ref"
      text " and "
      linkReference identifier="ref" type=shortcut
        text "ref"
      text "."
    "#);
}

#[test]
fn fixture_mixed_blocks() {
    assert_snapshot!(render_fixture("combos/mixed_blocks"), @r#"
    heading depth=1
      text "Title"
    paragraph
      text "Intro with "
      inlineCode "code"
      text "."
    thematicBreak
    list ordered=true start=1 spread=false marker='.'
      listItem spread=false
        paragraph
          text "one"
      listItem spread=false
        paragraph
          text "two"
    "#);
}

/// Node positions slice back to the source text they cover
#[test]
fn positions_slice_source() {
    let md = "Some *emphasis* here";
    let doc = parse(md).unwrap();
    let chars: Vec<char> = md.chars().collect();

    let emphasis = &doc.children[0].children[1];
    let position = emphasis.position.unwrap();
    let covered: String = chars[position.start.offset..position.end.offset]
        .iter()
        .collect();
    assert_eq!(covered, "*emphasis*");
}
