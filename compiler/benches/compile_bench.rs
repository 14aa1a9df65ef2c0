//! Pipeline benchmarks for the Kapila compiler.
//!
//! Run with: cargo bench -p kapila-compiler

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kapila_compiler::driver;
use kapila_compiler::parser::Parser;
use kapila_compiler::vm::Vm;

const HELLO: &str = "\"ನಮಸ್ಕಾರ\" ಮುದ್ರಿಸು.";

const SQUARE: &str = "ವರ್ಗ: ನಕಲು ಗುಣಿಸು ॥  ೫ ವರ್ಗ ಮುದ್ರಿಸು.";

const MAP_FOLD: &str = "[ ೧ ೨ ೩ ] [ ನಕಲು ಗುಣಿಸು ] ನಕ್ಷೆ  ೦ [ ಕೂಡು ] ಮಡಿಸು  ಮುದ್ರಿಸು.";

fn sources() -> [(&'static str, &'static str); 3] {
    [("hello", HELLO), ("square", SQUARE), ("map_fold", MAP_FOLD)]
}

fn bench_lexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("lex");
    for (name, src) in sources() {
        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), src, |b, src| {
            b.iter(|| driver::lex(black_box(src)));
        });
    }
    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, src) in sources() {
        let tokens = driver::lex(src);
        group.bench_with_input(BenchmarkId::from_parameter(name), &tokens, |b, tokens| {
            b.iter(|| Parser::new(black_box(tokens.clone())).parse());
        });
    }
    group.finish();
}

fn bench_typecheck(c: &mut Criterion) {
    let mut group = c.benchmark_group("typecheck");
    for (name, src) in sources() {
        let tokens = driver::lex(src);
        let (program, _) = driver::parse(tokens);
        group.bench_with_input(BenchmarkId::from_parameter(name), &program, |b, program| {
            b.iter(|| driver::advisory_typecheck(black_box(program)));
        });
    }
    group.finish();
}

fn bench_codegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("codegen");
    for (name, src) in sources() {
        group.bench_with_input(BenchmarkId::from_parameter(name), src, |b, src| {
            b.iter(|| driver::compile_source(black_box(src)));
        });
    }
    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    for (name, src) in sources() {
        group.bench_with_input(BenchmarkId::from_parameter(name), src, |b, src| {
            b.iter(|| {
                let mut out = Vec::new();
                let mut vm = Vm::new_empty(&mut out);
                let _ = driver::run_source(&mut vm, black_box(src));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lexer, bench_parser, bench_typecheck, bench_codegen, bench_run);
criterion_main!(benches);
