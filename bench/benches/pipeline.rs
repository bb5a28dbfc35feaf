use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use ziglite::{codegen, parser, type_checker};

static INPUT: &str = include_str!("../../samples/linked_list.zig");

fn criterion_benchmark(c: &mut Criterion) {
    let program = parser::parse_program(INPUT).unwrap();
    let options = codegen::Options::default();

    c.bench_function("checker", |b| {
        b.iter(|| black_box(type_checker::check(black_box(&program))));
    });
    c.bench_function("codegen", |b| {
        b.iter(|| black_box(codegen::generate(black_box(&program), &options)));
    });
    c.bench_function("analyze", |b| {
        b.iter(|| black_box(ziglite::analyze(black_box(INPUT))));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
