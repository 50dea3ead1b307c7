//! Repeating two-phase "cardiac" pulse.
//!
//! The timeline owns its own start stamp and is sampled against the
//! controller's clock, so its cadence never depends on the frame rate.

use crate::constants::BEAT_PEAK;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatTiming {
    pub rise: Duration,
    pub fall: Duration,
    pub hold: Duration,
}

impl BeatTiming {
    #[inline]
    pub fn cycle(&self) -> Duration {
        self.rise + self.fall + self.hold
    }

    /// Amplitude `elapsed` after the start of the first cycle.
    ///
    /// Rise uses a cubic ease-in, fall a quartic ease-out, then the value
    /// rests at zero for `hold` before the next cycle.
    pub fn amplitude_at(&self, elapsed: Duration) -> f32 {
        let cycle = self.cycle().as_secs_f64();
        if cycle <= 0.0 {
            return 0.0;
        }
        let t = elapsed.as_secs_f64() % cycle;
        let rise = self.rise.as_secs_f64();
        let fall = self.fall.as_secs_f64();
        if t < rise {
            BEAT_PEAK * ease_in_cubic((t / rise) as f32)
        } else if t < rise + fall {
            let local = ((t - rise) / fall) as f32;
            BEAT_PEAK * (1.0 - ease_out_quart(local))
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct BeatTimeline {
    timing: BeatTiming,
    started_at: Option<Duration>,
}

impl BeatTimeline {
    pub fn new(timing: BeatTiming) -> Self {
        Self {
            timing,
            started_at: None,
        }
    }

    /// (Re)starts the curve from phase 0 at `now`.
    pub fn start(&mut self, now: Duration) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Zero when stopped.
    pub fn amplitude(&self, now: Duration) -> f32 {
        match self.started_at {
            Some(t0) => self.timing.amplitude_at(now.saturating_sub(t0)),
            None => 0.0,
        }
    }
}

#[inline]
fn ease_in_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t
}

#[inline]
fn ease_out_quart(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv * inv
}
