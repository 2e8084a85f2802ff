//! Interpreted vs Compiled Engine Benchmark
//!
//! Runs each scenario's kernel directly, outside the trial runner, so the
//! numbers reflect the routines alone.
//!
//! - **Interpreted**: f64 per-pixel evaluation (baseline)
//! - **Compiled**: integer kernels over lookup tables

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pixelbench::{CompiledEngine, ImageBuffer, InterpretedEngine};

fn gradient(width: u32, height: u32) -> ImageBuffer {
    ImageBuffer::from_fn(width, height, |x, y| {
        [
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
            ((x ^ y) & 0xff) as u8,
            255,
        ]
    })
}

// 0.06 MP, 0.5 MP, 2 MP
const SIZES: [(u32, u32); 3] = [(320, 200), (960, 540), (1920, 1080)];

fn benchmark_invert(c: &mut Criterion) {
    let mut group = c.benchmark_group("invert");
    let interpreted = InterpretedEngine::new();
    let compiled = CompiledEngine::load().unwrap();

    for (width, height) in SIZES {
        let input = gradient(width, height);
        let label = format!("{}x{}", width, height);
        group.throughput(Throughput::Elements(input.pixel_count() as u64));

        group.bench_with_input(BenchmarkId::new("interpreted", &label), &input, |b, input| {
            b.iter(|| interpreted.invert(black_box(input.clone())));
        });
        group.bench_with_input(BenchmarkId::new("compiled", &label), &input, |b, input| {
            b.iter(|| compiled.invert(black_box(input.clone())));
        });
    }
    group.finish();
}

fn benchmark_edge_detect(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_detect");
    let interpreted = InterpretedEngine::new();
    let compiled = CompiledEngine::load().unwrap();

    for (width, height) in SIZES {
        let input = gradient(width, height);
        let label = format!("{}x{}", width, height);
        group.throughput(Throughput::Elements(input.pixel_count() as u64));

        group.bench_with_input(BenchmarkId::new("interpreted", &label), &input, |b, input| {
            b.iter(|| interpreted.edge_detect(black_box(input)));
        });
        group.bench_with_input(BenchmarkId::new("compiled", &label), &input, |b, input| {
            b.iter(|| compiled.edge_detect(black_box(input)));
        });
    }
    group.finish();
}

fn benchmark_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");
    group.sample_size(20);
    let interpreted = InterpretedEngine::new();
    let compiled = CompiledEngine::load().unwrap();

    for (width, height) in SIZES {
        let input = gradient(width, height);
        let label = format!("{}x{}", width, height);
        group.throughput(Throughput::Elements(input.pixel_count() as u64));

        group.bench_with_input(BenchmarkId::new("interpreted", &label), &input, |b, input| {
            b.iter(|| interpreted.quantize(black_box(input), 8));
        });
        group.bench_with_input(BenchmarkId::new("compiled", &label), &input, |b, input| {
            b.iter(|| compiled.quantize(black_box(input), 8));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_invert,
    benchmark_edge_detect,
    benchmark_quantize
);
criterion_main!(benches);
