use criterion::{Criterion, criterion_group, criterion_main};
use inkdown_engine::{ParserSession, RenderOptions, TextEdit};

mod common;

fn bench_full_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(30);

    let content = common::generate_markdown_content(100);
    group.bench_function("parse_mixed_document", |b| {
        let mut session = ParserSession::default();
        b.iter(|| {
            session.parse(std::hint::black_box(&content));
        });
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.sample_size(30);

    let content = common::generate_markdown_content(100);
    let opts = RenderOptions::default();

    group.bench_function("render_cold", |b| {
        let mut session = ParserSession::default();
        b.iter(|| {
            // Re-parse so every render misses the cache.
            session.parse(std::hint::black_box(&content));
            let html = session.render_html(&opts).expect("document is parsed");
            std::hint::black_box(html.len());
        });
    });

    group.bench_function("render_cached", |b| {
        let mut session = ParserSession::default();
        session.parse(&content);
        session.render_html(&opts).expect("document is parsed");
        b.iter(|| {
            let html = session.render_html(&opts).expect("document is parsed");
            std::hint::black_box(html.len());
        });
    });

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("updating");
    group.sample_size(30);

    // The sub-millisecond edit-to-tree target is the whole point of the
    // session; measure the single-word replacement path.
    let content = common::generate_edit_heavy_paragraph(500);
    group.bench_function("single_word_edit", |b| {
        let mut session = ParserSession::default();
        session.parse(&content);
        let edit = TextEdit::new(30, 35, "word0");
        b.iter(|| {
            session.update(std::hint::black_box(&edit)).expect("edit in range");
        });
    });

    group.finish();
}

criterion_group!(benches, bench_full_parse, bench_render, bench_update);
criterion_main!(benches);
