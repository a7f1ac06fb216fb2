//! Benchmarks for the click decay envelope.

use std::hint::black_box;

use clickwork::dsp::envelope::Envelope;
use clickwork::graph::node::RenderCtx;
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let ctx = RenderCtx::from_freq(48_000.0, 800.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Long decay so the benchmark stays inside the active stage
        let mut env = Envelope::decay(0.3, 0.01, 3600.0);
        env.note_on(&ctx);
        group.bench_with_input(BenchmarkId::new("decay", size), &size, |b, _| {
            b.iter(|| {
                env.render(black_box(&mut buffer));
            })
        });

        let mut idle = Envelope::decay(0.3, 0.01, 0.1);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
