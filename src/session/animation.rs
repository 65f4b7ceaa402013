use crate::geometry::Rect;
use std::time::{Duration, Instant};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(300);

/// Decelerating curve used by every launcher animation.
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

pub trait Lerp: Copy {
    fn lerp(from: Self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

fn lerp_i32(a: i32, b: i32, t: f32) -> i32 {
    (a as f32 + (b - a) as f32 * t).round() as i32
}

impl Lerp for Rect {
    fn lerp(from: Self, to: Self, t: f32) -> Self {
        Rect::new(
            lerp_i32(from.x, to.x, t),
            lerp_i32(from.y, to.y, t),
            lerp_i32(from.width, to.width, t),
            lerp_i32(from.height, to.height, t),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Lerp> {
    pub from: T,
    pub to: T,
    started: Instant,
    duration: Duration,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, started: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn value(&self, now: Instant) -> T {
        T::lerp(self.from, self.to, ease_out_cubic(self.progress(now)))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}

/// The one animation the controller runs at a time. Starting another
/// replaces it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Animation {
    Fade(Tween<f32>),
    Reshape(Tween<Rect>),
}

impl Animation {
    pub fn is_finished(&self, now: Instant) -> bool {
        match self {
            Animation::Fade(t) => t.is_finished(now),
            Animation::Reshape(t) => t.is_finished(now),
        }
    }
}
