use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use ziglite::{lexer, token::Token};

static INPUT: &str = include_str!("../../samples/linked_list.zig");

fn lexer(input: &str, tokens: &mut Vec<Token>) {
    lexer::lex(input, tokens);
    let valid = tokens.iter().filter(|t| !t.kind.is_error()).count();
    black_box(valid);
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut tokens = Vec::with_capacity(lexer::SUGGESTED_TOKENS_CAPACITY);

    c.bench_function("lexer", |b| {
        b.iter(|| {
            tokens.clear();
            lexer(black_box(INPUT), &mut tokens);
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
