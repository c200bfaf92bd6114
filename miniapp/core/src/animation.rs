//! Counter Animation
//!
//! Count-up effect for the home view stats. An animation is a finite iterator
//! of eased frames; the surface pulls frames on its own tick and paints each
//! value. The last frame always carries the exact target.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default length of a count-up
pub const DEFAULT_COUNTER_DURATION: Duration = Duration::from_millis(1000);

/// Default frame spacing (~60 fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Easing functions for counters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    Linear,

    /// Cubic ease out
    EaseOutCubic,

    /// Quartic ease out
    #[default]
    EaseOutQuart,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        }
    }
}

/// One painted value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CounterFrame {
    /// Time since the animation started
    pub elapsed: Duration,
    /// Value to paint, floored to a whole number until the final frame
    pub value: f64,
}

/// Count-up from zero to a target
#[derive(Clone, Debug)]
pub struct CounterAnimation {
    target: f64,
    duration: Duration,
    frame_interval: Duration,
    easing: EasingFunction,
    next_frame: u32,
    total_frames: u32,
}

impl CounterAnimation {
    /// Count up to `target` over one second with ease-out-quart
    #[must_use]
    pub fn new(target: f64) -> Self {
        Self::with_timing(target, DEFAULT_COUNTER_DURATION, DEFAULT_FRAME_INTERVAL)
    }

    /// Count up with explicit timing
    #[must_use]
    pub fn with_timing(target: f64, duration: Duration, frame_interval: Duration) -> Self {
        let target = if target.is_finite() { target } else { 0.0 };
        let interval = frame_interval.as_millis().max(1);
        let steps = duration.as_millis().div_ceil(interval);
        let total_frames = u32::try_from(steps).unwrap_or(u32::MAX).saturating_add(1);

        Self {
            target,
            duration,
            frame_interval,
            easing: EasingFunction::default(),
            next_frame: 0,
            total_frames,
        }
    }

    /// Set easing function
    #[must_use]
    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Final value
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Iterator for CounterAnimation {
    type Item = CounterFrame;

    fn next(&mut self) -> Option<CounterFrame> {
        if self.next_frame >= self.total_frames {
            return None;
        }
        let frame = self.next_frame;
        self.next_frame += 1;

        if frame + 1 == self.total_frames {
            return Some(CounterFrame {
                elapsed: self.duration,
                value: self.target,
            });
        }

        let elapsed = (self.frame_interval * frame).min(self.duration);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / self.duration.as_secs_f64()
        };
        Some(CounterFrame {
            elapsed,
            value: (self.target * self.easing.apply(progress)).floor(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.total_frames - self.next_frame).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for CounterAnimation {}
