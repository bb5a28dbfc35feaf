use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use ziglite::{lexer, parser};

static INPUT: &str = include_str!("../../samples/linked_list.zig");

fn criterion_benchmark(c: &mut Criterion) {
    let tokens = lexer::tokenize(INPUT);

    c.bench_function("parser", |b| {
        b.iter(|| {
            let program = parser::parse(black_box(&tokens)).unwrap();
            black_box(program);
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
