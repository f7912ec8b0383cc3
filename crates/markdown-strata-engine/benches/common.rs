// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\nParagraph with *emphasis*, **strong** and `code` plus a [link](/url \"t\").\n\n- Bullet point\n  - Nested item\n- [x] Task item\n\n> Quoted ~~text~~ <https://example.com>\n\n| a | b |\n| - | -: |\n| 1 | 2 |\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n[ref]: /target\n\nSee [ref] and ![img](/i.png).\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_delimiter_heavy(size: usize) -> String {
    "*a **b** c* _d_ ***e*** `f` [g](/h) ".repeat(size)
}
