//! Benchmarks for one scheduling pass on the control thread.

use std::hint::black_box;

use clickwork::{
    clock::ManualClock, engine::RecordingBackend, scheduler::ManualTimer, Metronome,
    SchedulerConfig, Tempo,
};
use criterion::{BenchmarkId, Criterion};

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/scheduler");

    for bpm in [40u32, 120, 300] {
        let backend = RecordingBackend::new(ManualClock::new());
        let clock = backend.clock().clone();
        let config = SchedulerConfig::new().tempo(Tempo::clamped(bpm));
        let Ok(mut metronome) = Metronome::new(backend, ManualTimer::new(), config) else {
            continue;
        };
        let _ = metronome.activate();

        group.bench_with_input(BenchmarkId::new("pass", bpm), &bpm, |b, _| {
            b.iter(|| {
                clock.advance(0.025);
                if let Some(handle) = metronome.timer_mut().fire() {
                    let _ = black_box(metronome.on_timer(handle));
                }
                metronome.drain_events();
            })
        });
    }

    group.finish();
}
