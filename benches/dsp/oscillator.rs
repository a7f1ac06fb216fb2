//! Benchmarks for the sine oscillator.

use std::hint::black_box;

use clickwork::dsp::oscillator::OscillatorBlock;
use clickwork::graph::node::RenderCtx;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_freq(48_000.0, 800.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut osc = OscillatorBlock::sine();

        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
