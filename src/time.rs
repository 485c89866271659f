//! Frame-driven delay before a pending room transition fires.
//!
//! `draw_web()` calls at ~60fps with variable delta. The timer accumulates
//! frame deltas from `performance.now()` instead of owning a JS timeout, so
//! the delay is deterministic and testable without a browser.

/// How long the success message stays on screen before the next room loads.
pub const TRANSITION_DELAY_MS: f64 = 2000.0;

/// Largest frame delta counted, so a backgrounded tab doesn't skip the delay.
const MAX_FRAME_DELTA_MS: f64 = 500.0;

pub struct TransitionTimer {
    delay_ms: f64,
    /// Milliseconds left before firing; `None` when nothing is scheduled.
    remaining: Option<f64>,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl TransitionTimer {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            remaining: None,
            last_timestamp: None,
        }
    }

    /// Start (or restart) the countdown.
    pub fn schedule(&mut self) {
        self.remaining = Some(self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Feed the frame timestamp. Returns true exactly once, on the frame
    /// where the delay has elapsed.
    pub fn update(&mut self, now_ms: f64) -> bool {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        let Some(remaining) = self.remaining else {
            return false;
        };
        let remaining = remaining - delta;
        if remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            self.remaining = Some(remaining);
            false
        }
    }
}

impl Default for TransitionTimer {
    fn default() -> Self {
        Self::new(TRANSITION_DELAY_MS)
    }
}
