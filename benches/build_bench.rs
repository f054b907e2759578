//! Performance benchmarks for versepack
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fmt::Write;

const SAMPLE_VERSES: &[&str] = &[
    "In the beginning God created the heaven and the earth.",
    "And the earth was without form, and void; and darkness [was] upon the face of the deep.",
    "And the Spirit of God moved upon the face of the waters.",
    "And God said, Let there be light: and there was light.",
    "And God saw the light, that [it was] good: and God divided the light from the darkness.",
    "And God called the light Day, and the darkness he called Night.",
    "And the evening and the morning were the first day.",
];

/// Generate a canonical corpus with `books` books of `chapters` chapters,
/// ten verses each, cycling through the sample verse texts.
fn synthetic_corpus(books: usize, chapters: usize) -> String {
    let names = ["Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy"];
    let mut out = String::new();
    let mut next = 0usize;
    for book in 0..books {
        writeln!(out, "B:{}", names[book]).unwrap();
        for chapter in 1..=chapters {
            for verse in 1..=10 {
                writeln!(
                    out,
                    "{chapter}:{verse} {}",
                    SAMPLE_VERSES[next % SAMPLE_VERSES.len()]
                )
                .unwrap();
                next += 1;
            }
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let corpus = synthetic_corpus(3, 20);
    c.bench_function("parse_600_verses", |b| {
        b.iter(|| versepack::parser::parse_str(black_box(&corpus)).unwrap())
    });
}

fn bench_word_scan(c: &mut Criterion) {
    let doc = versepack::parser::parse_str(&synthetic_corpus(3, 20)).unwrap();
    c.bench_function("word_index_600_verses", |b| {
        b.iter(|| {
            let mut index = versepack::index::WordIndex::new();
            index.index_document(black_box(&doc)).unwrap();
            index.finalize();
            index
        })
    });
}

fn bench_full_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_build");
    for chapters in [5usize, 20, 50] {
        let corpus = synthetic_corpus(5, chapters);
        group.bench_with_input(
            BenchmarkId::from_parameter(chapters * 5 * 10),
            &corpus,
            |b, corpus| b.iter(|| versepack::build::build_str(black_box(corpus), b"").unwrap()),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_word_scan, bench_full_build);
criterion_main!(benches);
