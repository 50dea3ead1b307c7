use heartbeat_core::{BeatTimeline, BeatTiming, EffectConfig};
use std::time::Duration;

fn default_timeline() -> BeatTimeline {
    BeatTimeline::new(EffectConfig::default().beat_timing())
}

#[test]
fn default_curve_matches_reference_samples() {
    let mut beat = default_timeline();
    let t0 = Duration::from_millis(250);
    beat.start(t0);
    let samples = [
        (0, 0.0),
        (300, 0.0625),
        (600, 0.5),
        (900, 0.03125),
        (1200, 0.0),
        (1500, 0.0),
    ];
    for (ms, expected) in samples {
        let a = beat.amplitude(t0 + Duration::from_millis(ms));
        assert!((a - expected).abs() < 1e-5, "{ms}ms: got {a}, want {expected}");
    }
}

#[test]
fn curve_repeats_every_cycle() {
    let timing = EffectConfig::default().beat_timing();
    assert_eq!(timing.cycle(), Duration::from_millis(1500));
    for ms in [120u64, 450, 700, 1100] {
        let a = timing.amplitude_at(Duration::from_millis(ms));
        let b = timing.amplitude_at(Duration::from_millis(ms + 3000));
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn rise_is_monotonic_and_fall_is_monotonic() {
    let timing = BeatTiming {
        rise: Duration::from_millis(600),
        fall: Duration::from_millis(600),
        hold: Duration::from_millis(300),
    };
    let rise: Vec<f32> = (0..600)
        .step_by(20)
        .map(|ms| timing.amplitude_at(Duration::from_millis(ms)))
        .collect();
    assert!(rise.windows(2).all(|w| w[0] <= w[1]));
    let fall: Vec<f32> = (600..1200)
        .step_by(20)
        .map(|ms| timing.amplitude_at(Duration::from_millis(ms)))
        .collect();
    assert!(fall.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn restart_resets_phase() {
    let mut beat = default_timeline();
    beat.start(Duration::ZERO);
    assert!(beat.amplitude(Duration::from_millis(600)) > 0.4);
    beat.start(Duration::from_millis(600));
    assert_eq!(beat.amplitude(Duration::from_millis(600)), 0.0);
    beat.stop();
    assert_eq!(beat.amplitude(Duration::from_millis(900)), 0.0);
}
