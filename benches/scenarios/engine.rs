//! Benchmarks for `ClickEngine::render`, the body of the audio callback.

use std::hint::black_box;

use clickwork::engine::{click_channel, AudioEmitter, ClickSound};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SILENCE ===
        // Idle metronome: drain an empty queue and advance the clock
        let (_emitter, mut engine) = click_channel(48_000.0, 64);
        group.bench_with_input(BenchmarkId::new("silence", size), &size, |b, _| {
            b.iter(|| {
                engine.render(black_box(&mut buffer));
            })
        });

        // === ONE CLICK ===
        // A fresh click every iteration, starting mid-block
        let (mut emitter, mut engine) = click_channel(48_000.0, 64);
        let sound = ClickSound::default();
        group.bench_with_input(BenchmarkId::new("click", size), &size, |b, _| {
            b.iter(|| {
                let onset = emitter.now() + (size / 2) as f64 / 48_000.0;
                let _ = emitter.emit(&sound.at(onset));
                engine.render(black_box(&mut buffer));
            })
        });

        // === OVERLAPPING ===
        // Eight clicks sounding at once (extreme tempo or very long clicks)
        let (mut emitter, mut engine) = click_channel(48_000.0, 64);
        let long = ClickSound::default().duration(3600.0);
        for n in 0..8 {
            let _ = emitter.emit(&long.at(n as f64 / 48_000.0));
        }
        engine.render(&mut buffer);
        group.bench_with_input(BenchmarkId::new("overlap_8", size), &size, |b, _| {
            b.iter(|| {
                engine.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
