//! Benchmarks for atspdf parsing, embedding and scoring.
//!
//! Run with: cargo bench
//!
//! Inputs are generated with the crate's own composer so every file is valid.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use atspdf::{AtsPdf, ComposeOptions, ExtractOptions, KeywordSet, TextExtractor};

const REFERENCE: &str = "Python, SQL, Docker, AWS, Linux, Git, Kubernetes, Terraform, Rust, GraphQL";

/// A document with `page_count` full pages of resume-like text.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let per_page = ComposeOptions::default().lines_per_page();
    let text: Vec<String> = (0..page_count * per_page)
        .map(|i| format!("- Line {}: built Python services on Linux with SQL storage.", i))
        .collect();
    atspdf::create_bytes(&text.join("\n"), &KeywordSet::parse("Docker AWS")).unwrap()
}

/// Benchmark PDF format detection.
fn bench_format_detection(c: &mut Criterion) {
    let pdf_data = create_test_pdf(1);
    let non_pdf_data = b"Not a PDF file at all, just random text content";

    c.bench_function("detect_valid_pdf", |b| {
        b.iter(|| atspdf::detect_format_from_bytes(black_box(&pdf_data)).unwrap());
    });

    c.bench_function("detect_non_pdf", |b| {
        b.iter(|| atspdf::detect_format_from_bytes(black_box(non_pdf_data)).is_err());
    });
}

/// Benchmark parsing and text extraction at various sizes.
fn bench_pdf_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_parsing");

    for page_count in [1, 5, 10].iter() {
        let data = create_test_pdf(*page_count);

        group.bench_function(format!("parse_{}_pages", page_count), |b| {
            b.iter(|| atspdf::parse_bytes(black_box(&data)).unwrap());
        });

        let doc = atspdf::parse_bytes(&data).unwrap();
        group.bench_function(format!("extract_{}_pages", page_count), |b| {
            b.iter(|| {
                TextExtractor::new(black_box(&doc), ExtractOptions::visible_only())
                    .extract()
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark appending a keyword layer and scoring.
fn bench_embed_and_analyze(c: &mut Criterion) {
    let data = create_test_pdf(5);
    let keywords = KeywordSet::parse("Kubernetes, Terraform");
    let reference = KeywordSet::parse(REFERENCE);

    c.bench_function("modify_5_pages", |b| {
        b.iter(|| atspdf::modify_bytes(black_box(&data), &keywords).unwrap());
    });

    c.bench_function("analyze_5_pages", |b| {
        b.iter(|| AtsPdf::new().analyze(black_box(&data), &reference).unwrap());
    });
}

criterion_group!(
    benches,
    bench_format_detection,
    bench_pdf_parsing,
    bench_embed_and_analyze,
);
criterion_main!(benches);
