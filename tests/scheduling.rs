//! End-to-end scheduling behaviour, driven with a hand-fired timer and a
//! hand-advanced clock so every pass is deterministic.

use std::time::Duration;

use clickwork::{
    clock::{ManualClock, SchedulerClock},
    engine::RecordingBackend,
    scheduler::ManualTimer,
    Metronome, MetronomeError, MetronomeEvent, SchedulerConfig, Tempo,
};

const EPS: f64 = 1e-9;

type TestMetronome = Metronome<RecordingBackend, ManualTimer>;

fn metronome_at(bpm: u32, start: f64) -> (TestMetronome, RecordingBackend) {
    let backend = RecordingBackend::new(ManualClock::starting_at(start));
    let config = SchedulerConfig::new().tempo(Tempo::clamped(bpm));
    let metronome = Metronome::new(backend.clone(), ManualTimer::new(), config).unwrap();
    (metronome, backend)
}

/// Fire the re-arm timer pass after pass for `seconds` of clock time.
///
/// Each pass lands `poll_interval + extra(pass)` after the previous one.
/// Returns how many pulses each pass produced.
fn run_for(
    metronome: &mut TestMetronome,
    clock: &ManualClock,
    seconds: f64,
    mut extra: impl FnMut(usize) -> f64,
) -> Vec<usize> {
    let end = clock.now() + seconds;
    let mut per_pass = Vec::new();
    let mut pass = 0;

    while clock.now() < end {
        let Some((_, delay)) = metronome.timer_mut().pending() else {
            break;
        };
        let Some(handle) = metronome.timer_mut().fire() else {
            break;
        };
        clock.advance(delay.as_secs_f64() + extra(pass));
        metronome.drain_events();
        metronome.on_timer(handle).unwrap();

        let pulses = metronome
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, MetronomeEvent::Pulse(_)))
            .count();
        per_pass.push(pulses);
        pass += 1;
    }
    per_pass
}

fn assert_on_grid(times: &[f64], origin: f64, interval: f64) {
    for (n, time) in times.iter().enumerate() {
        let ideal = origin + n as f64 * interval;
        assert!(
            (time - ideal).abs() < EPS,
            "beat {n} at {time}, expected {ideal}"
        );
    }
}

#[test]
fn scenario_a_120_bpm_from_ten_seconds() {
    let (mut metronome, backend) = metronome_at(120, 10.0);
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 2.0, |_| 0.0);

    let times = backend.times();
    assert!(times.len() >= 4);
    for (actual, expected) in times.iter().zip([10.0, 10.5, 11.0, 11.5]) {
        assert!((actual - expected).abs() < EPS, "{actual} != {expected}");
    }
}

#[test]
fn every_tempo_produces_exact_intervals() {
    let tempos = (40..=300).step_by(13).chain([300]);
    for bpm in tempos {
        let (mut metronome, backend) = metronome_at(bpm, 3.25);
        metronome.activate().unwrap();
        run_for(&mut metronome, backend.clock(), 4.0, |_| 0.0);

        let times = backend.times();
        let interval = 60.0 / bpm as f64;
        assert!(times.len() >= 2, "{bpm} BPM produced {} beats", times.len());
        for pair in times.windows(2) {
            assert!(pair[1] > pair[0]);
            assert!(
                (pair[1] - pair[0] - interval).abs() < EPS,
                "{bpm} BPM: interval {} != {interval}",
                pair[1] - pair[0]
            );
        }
    }
}

#[test]
fn late_timer_catches_up_without_drift() {
    let (mut metronome, backend) = metronome_at(300, 1.0);
    metronome.activate().unwrap();

    // Every third pass arrives a whole lookahead window late
    run_for(&mut metronome, backend.clock(), 6.0, |pass| {
        if pass % 3 == 0 {
            0.1
        } else {
            0.0
        }
    });

    let times = backend.times();
    assert!(times.len() >= 29);
    assert_on_grid(&times, 1.0, 0.2);
    // nothing was scheduled behind the clock
    assert!(times.last().copied().unwrap_or_default() < backend.clock().now() + 0.1);
}

#[test]
fn stalled_timer_emits_backlog_in_one_pass() {
    let (mut metronome, backend) = metronome_at(300, 0.0);
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 0.5, |_| 0.0);

    // One pass arrives a full second late
    let per_pass = run_for(&mut metronome, backend.clock(), 0.01, |_| 1.0);
    assert_eq!(per_pass.len(), 1);
    assert!(per_pass[0] >= 4, "expected a burst, got {}", per_pass[0]);

    assert_on_grid(&backend.times(), 0.0, 0.2);
}

#[test]
fn scenario_b_extremes_fit_the_window() {
    for (bpm, interval) in [(40, 1.5), (300, 0.2)] {
        let (mut metronome, backend) = metronome_at(bpm, 0.0);
        metronome.activate().unwrap();
        let per_pass = run_for(&mut metronome, backend.clock(), 5.0, |_| 0.0);

        assert!(per_pass.iter().all(|&n| n <= 1), "{bpm} BPM: {per_pass:?}");
        assert_on_grid(&backend.times(), 0.0, interval);
    }
}

#[test]
fn scenario_c_tempo_is_clamped() {
    let (mut metronome, _backend) = metronome_at(120, 0.0);
    assert_eq!(metronome.set_tempo(500).map(Tempo::bpm), Ok(300));
    assert_eq!(metronome.set_tempo(10).map(Tempo::bpm), Ok(40));
    assert_eq!(metronome.tempo().bpm(), 40);
}

#[test]
fn scenario_d_deactivate_cancels_pending_rearm() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 1.2, |_| 0.0);

    let Some((stale, _)) = metronome.timer_mut().pending() else {
        panic!("running metronome must have a pending timer");
    };
    let emitted = backend.times().len();

    metronome.deactivate();
    assert!(!metronome.is_running());
    assert!(metronome.timer_mut().pending().is_none());
    assert_eq!(metronome.timer_mut().cancelled_count(), 1);

    backend.clock().advance(5.0);
    metronome.on_timer(stale).unwrap();
    assert_eq!(backend.times().len(), emitted);
}

#[test]
fn activate_while_running_is_idempotent() {
    let (mut metronome, backend) = metronome_at(120, 2.0);
    metronome.activate().unwrap();
    backend.clock().advance(0.2);
    metronome.activate().unwrap();

    assert_eq!(metronome.timer_mut().armed_count(), 1);
    assert_eq!(backend.times(), vec![2.0]);
    assert!((metronome.scheduler().next_pulse_time() - 2.5).abs() < EPS);
}

#[test]
fn restart_begins_at_the_new_now() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 1.3, |_| 0.0);
    metronome.deactivate();
    let before = backend.times().len();

    backend.clock().advance(3.37);
    let restart_at = backend.clock().now();
    metronome.activate().unwrap();

    let times = backend.times();
    assert_eq!(times.len(), before + 1);
    assert!((times[before] - restart_at).abs() < EPS);
    assert_eq!(metronome.scheduler().beats_scheduled(), 1);
}

#[test]
fn tempo_set_while_idle_applies_on_next_activation() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.set_tempo(60).unwrap();
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 3.0, |_| 0.0);

    assert_on_grid(&backend.times(), 0.0, 1.0);
}

#[test]
fn tempo_change_while_running_is_refused() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.activate().unwrap();

    assert_eq!(metronome.set_tempo(200), Err(MetronomeError::TempoLocked));
    run_for(&mut metronome, backend.clock(), 2.0, |_| 0.0);
    assert_on_grid(&backend.times(), 0.0, 0.5);
}

#[test]
fn audio_loss_mid_run_forces_idle() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 1.0, |_| 0.0);
    metronome.drain_events();

    backend.set_unavailable(true);
    backend.clock().advance(0.5);
    let Some(handle) = metronome.timer_mut().fire() else {
        panic!("expected a pending timer");
    };
    let result = metronome.on_timer(handle);

    assert!(matches!(result, Err(MetronomeError::AudioUnavailable(_))));
    assert!(!metronome.is_running());
    assert!(metronome.timer_mut().pending().is_none());

    let events = metronome.drain_events();
    assert!(matches!(
        events.as_slice(),
        [MetronomeEvent::Fault(MetronomeError::AudioUnavailable(_)), MetronomeEvent::Stopped]
    ));
}

#[test]
fn clicks_queued_before_audio_loss_are_still_reported() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.activate().unwrap();
    metronome.drain_events();

    // Two seconds late: four beats are due but only two more fit
    backend.fail_after(3);
    backend.clock().advance(2.0);
    let Some(handle) = metronome.timer_mut().fire() else {
        panic!("expected a pending timer");
    };
    assert!(metronome.on_timer(handle).is_err());

    let events = metronome.drain_events();
    assert!(
        matches!(
            events.as_slice(),
            [
                MetronomeEvent::Pulse(first),
                MetronomeEvent::Pulse(second),
                MetronomeEvent::Fault(MetronomeError::AudioUnavailable(_)),
                MetronomeEvent::Stopped,
            ] if first.beat == 1 && second.beat == 2
        ),
        "unexpected events: {events:?}"
    );
    assert_eq!(backend.times(), vec![0.0, 0.5, 1.0]);
}

#[test]
fn timer_exhaustion_mid_run_forces_idle() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    metronome.activate().unwrap();
    run_for(&mut metronome, backend.clock(), 0.3, |_| 0.0);

    metronome.timer_mut().fail_next_arm("timer table full");
    let Some(handle) = metronome.timer_mut().fire() else {
        panic!("expected a pending timer");
    };
    backend.clock().advance(0.025);

    assert_eq!(
        metronome.on_timer(handle),
        Err(MetronomeError::TimerArmFailure("timer table full".into()))
    );
    assert!(!metronome.is_running());
}

#[test]
fn output_is_opened_once_and_kept() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    assert_eq!(backend.open_count(), 0);
    assert!(metronome.now().is_none());

    metronome.activate().unwrap();
    metronome.deactivate();
    metronome.activate().unwrap();

    assert_eq!(backend.open_count(), 1);
    assert!(metronome.is_output_open());
}

#[test]
fn refused_output_leaves_metronome_idle() {
    let (mut metronome, backend) = metronome_at(120, 0.0);
    backend.refuse_open(true);

    assert!(matches!(
        metronome.activate(),
        Err(MetronomeError::AudioUnavailable(_))
    ));
    assert!(!metronome.is_running());
    assert!(backend.times().is_empty());

    backend.refuse_open(false);
    metronome.activate().unwrap();
    assert!(metronome.is_running());
}

#[test]
fn lifecycle_events_bracket_the_pulses() {
    let (mut metronome, backend) = metronome_at(120, 4.0);
    metronome.activate().unwrap();
    backend.clock().advance(0.45);
    let Some(handle) = metronome.timer_mut().fire() else {
        panic!("expected a pending timer");
    };
    metronome.on_timer(handle).unwrap();
    metronome.deactivate();

    let events = metronome.drain_events();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], MetronomeEvent::Started { at: 4.0 });
    assert!(matches!(events[1], MetronomeEvent::Pulse(p) if p.beat == 0 && p.time == 4.0));
    assert!(matches!(events[2], MetronomeEvent::Pulse(p) if p.beat == 1));
    assert_eq!(events[3], MetronomeEvent::Stopped);
}

#[test]
fn poll_interval_is_the_rearm_delay() {
    let backend = RecordingBackend::new(ManualClock::new());
    let config = SchedulerConfig::new()
        .lookahead(Duration::from_millis(200))
        .poll_interval(Duration::from_millis(40));
    let mut metronome = Metronome::new(backend, ManualTimer::new(), config).unwrap();
    metronome.activate().unwrap();

    assert_eq!(
        metronome.timer_mut().pending().map(|(_, delay)| delay),
        Some(Duration::from_millis(40))
    );
}
