//! Fixed-period and one-shot timers
//!
//! Timers are plain values owned by the component that uses them and are
//! advanced with the same `dt` as the frame, so they never interleave with
//! a tick mid-way.

use serde::{Deserialize, Serialize};

/// Fires every `period` seconds of advanced time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepeatingTimer {
    period: f32,
    accumulator: f32,
}

impl RepeatingTimer {
    pub fn new(period: f32) -> Self {
        debug_assert!(period > 0.0);
        Self {
            period,
            accumulator: 0.0,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    /// Advance by `dt`; returns how many periods completed
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut fired = 0;
        // Small epsilon so 4 x 0.25 counts as a full second despite f32 drift
        while self.accumulator + 1e-5 >= self.period {
            self.accumulator -= self.period;
            fired += 1;
        }
        if self.accumulator < 0.0 {
            self.accumulator = 0.0;
        }
        fired
    }
}

/// Fires once after being armed; arming again replaces the pending deadline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneShotTimer {
    remaining: Option<f32>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self { remaining: None }
    }

    /// Schedule firing `duration` seconds from now, dropping any pending deadline
    pub fn arm(&mut self, duration: f32) {
        self.remaining = Some(duration);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Advance by `dt`; returns true exactly once when the deadline passes
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) if left - dt <= 1e-5 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - dt);
                false
            }
            None => false,
        }
    }
}
