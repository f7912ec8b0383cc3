use criterion::{Criterion, criterion_group, criterion_main};
use markdown_strata_engine::{Parser, ParserOptions};
mod common;

fn bench_documents(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let parser = Parser::with_options(&ParserOptions::default()).unwrap();
    let content = common::generate_markdown_content(100);
    group.bench_function("strata_document", |b| {
        b.iter(|| {
            let doc = parser.parse(std::hint::black_box(&content)).unwrap();
            std::hint::black_box(doc);
        });
    });

    let inline = common::generate_delimiter_heavy(500);
    group.bench_function("strata_inline_heavy", |b| {
        b.iter(|| {
            let doc = parser.parse(std::hint::black_box(&inline)).unwrap();
            std::hint::black_box(doc);
        });
    });

    group.bench_function("pulldown_cmark_baseline", |b| {
        b.iter(|| {
            let events: Vec<_> =
                pulldown_cmark::Parser::new(std::hint::black_box(&content)).collect();
            std::hint::black_box(events);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_documents);
criterion_main!(benches);
