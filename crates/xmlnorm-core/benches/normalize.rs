use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use xmlnorm_core::{normalize_all, parser, semantic_hash, NormalizeOptions};

// ---------------------------------------------------------------------------
// Document generators
// ---------------------------------------------------------------------------

/// Catalog of `n` products, children deliberately out of canonical order.
fn make_catalog(n: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<Catalog>\n");
    for i in 0..n {
        let _ = writeln!(
            xml,
            "  <Product sku=\"P{i}\" category=\"c{}\">\
             <Specs><Spec name=\"Weight\">{i} g</Spec><Spec name=\"RefreshRate\">60Hz</Spec></Specs>\
             <Price currency=\"EUR\">{}.99</Price>\
             <Name>  Product   {i} </Name>\
             </Product>",
            i % 7,
            10 + i
        );
    }
    xml.push_str("</Catalog>\n");
    xml
}

/// Namespace declarations scattered below the root.
fn make_namespaced(n: usize) -> String {
    let mut xml = String::from("<root>\n");
    for i in 0..n {
        let _ = writeln!(
            xml,
            "  <group xmlns:n{}=\"urn:ns:{}\"><n{}:item k=\"{i}\"/></group>",
            i % 16,
            i % 16,
            i % 16
        );
    }
    xml.push_str("</root>\n");
    xml
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_normalize_small(c: &mut Criterion) {
    let xml = make_catalog(10);
    let opts = NormalizeOptions::default();
    c.bench_function("normalize_small", |b| {
        b.iter(|| normalize_all(black_box(&xml), &opts));
    });
}

fn bench_normalize_large(c: &mut Criterion) {
    let xml = make_catalog(1000);
    let opts = NormalizeOptions::default();
    c.bench_function("normalize_large", |b| {
        b.iter(|| normalize_all(black_box(&xml), &opts));
    });
}

fn bench_normalize_compact(c: &mut Criterion) {
    let xml = make_catalog(1000);
    let opts = NormalizeOptions::compact();
    c.bench_function("normalize_compact", |b| {
        b.iter(|| normalize_all(black_box(&xml), &opts));
    });
}

fn bench_parse_only(c: &mut Criterion) {
    let xml = make_catalog(1000);
    c.bench_function("parse_only", |b| {
        b.iter(|| parser::parse(black_box(&xml)));
    });
}

fn bench_namespace_hoisting(c: &mut Criterion) {
    let xml = make_namespaced(500);
    let opts = NormalizeOptions::default();
    c.bench_function("namespace_hoisting", |b| {
        b.iter(|| normalize_all(black_box(&xml), &opts));
    });
}

fn bench_semantic_hash(c: &mut Criterion) {
    let xml = make_catalog(100);
    let opts = NormalizeOptions::default();
    c.bench_function("semantic_hash", |b| {
        b.iter(|| semantic_hash(black_box(&xml), &opts));
    });
}

criterion_group!(
    normalize,
    bench_normalize_small,
    bench_normalize_large,
    bench_normalize_compact
);

criterion_group!(stages, bench_parse_only, bench_namespace_hoisting, bench_semantic_hash);

criterion_main!(normalize, stages);
