use std::time::{Duration, Instant};

pub const PREDICTION_TWEEN: Duration = Duration::from_millis(700);

pub type Easing = fn(f64) -> f64;

pub fn linear(t: f64) -> f64 {
    t
}

#[derive(Debug, Clone, Copy)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: Duration,
    started: Instant,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration: Duration, started: Instant, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            started,
            easing,
        }
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Value at `now`, rounded to two decimals.
    pub fn sample(&self, now: Instant) -> f64 {
        let t = (self.easing)(self.progress(now));
        round2(self.from + (self.to - self.from) * t)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn target(&self) -> f64 {
        self.to
    }
}

/// A displayed number that eases toward its latest target. Retargeting replaces
/// the running tween instead of queueing behind it.
#[derive(Debug, Clone, Default)]
pub struct AnimatedValue {
    displayed: Option<f64>,
    active: Option<Tween>,
}

impl AnimatedValue {
    pub fn retarget(&mut self, target: f64, now: Instant) {
        if let Some(active) = self.active.take() {
            self.displayed = Some(active.sample(now));
        }
        let from = self.displayed.unwrap_or(0.0);
        self.active = Some(Tween::new(from, target, PREDICTION_TWEEN, now, linear));
        self.displayed = Some(from);
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.displayed = None;
    }

    /// Advances the running tween; returns the value to draw.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        if let Some(active) = self.active {
            self.displayed = Some(active.sample(now));
            if active.is_finished(now) {
                self.active = None;
            }
        }
        self.displayed
    }

    pub fn displayed(&self) -> Option<f64> {
        self.displayed
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<f64> {
        self.active.map(|t| t.target()).or(self.displayed)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
