//! Session state: score, elapsed time and the run's lifecycle phase
//!
//! Two fixed-period timers drive the numbers while the run is going: a
//! score tick every 0.25 s and an elapsed-seconds tick every second. The
//! pause toggle is turned into Pause/Resume requests here; the phase itself
//! only changes when the matching signal comes back through the hub.

use serde::{Deserialize, Serialize};

use super::events::Signal;
use super::tick::{Frame, Tickable};
use super::timer::RepeatingTimer;
use crate::tuning::Tuning;

/// Run lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Menu,
    Running,
    Paused,
    Ended,
}

/// Score and time for the current run
#[derive(Debug, Clone)]
pub struct SessionState {
    score: u64,
    elapsed_seconds: u32,
    phase: SessionPhase,
    score_timer: RepeatingTimer,
    elapsed_timer: RepeatingTimer,
    score_base_increment: u64,
    score_speed_factor: f32,
}

impl SessionState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            elapsed_seconds: 0,
            phase: SessionPhase::Menu,
            score_timer: RepeatingTimer::new(tuning.score_period),
            elapsed_timer: RepeatingTimer::new(tuning.elapsed_period),
            score_base_increment: tuning.score_base_increment,
            score_speed_factor: tuning.score_speed_factor,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn is_ended(&self) -> bool {
        self.phase == SessionPhase::Ended
    }

    /// Points awarded per score tick at the given player speed
    pub fn score_increment(&self, player_speed: f32) -> u64 {
        let bonus = (self.score_speed_factor * player_speed.max(0.0)).round() as u64;
        self.score_base_increment + bonus
    }

    /// Multiply the score by `factor`, rounding to the nearest point
    pub fn apply_score_factor(&mut self, factor: f64) {
        if self.is_ended() {
            return;
        }
        self.score = (self.score as f64 * factor).round().max(0.0) as u64;
    }

    /// Signal the toggle input should produce in the current phase, if any
    pub fn pause_toggle_request(&self) -> Option<Signal> {
        match self.phase {
            SessionPhase::Running => Some(Signal::Pause),
            SessionPhase::Paused => Some(Signal::Resume),
            SessionPhase::Menu | SessionPhase::Ended => None,
        }
    }

    pub fn on_signal(&mut self, signal: Signal) {
        let next = match (signal, self.phase) {
            (_, SessionPhase::Ended) => SessionPhase::Ended,
            (Signal::End, _) => SessionPhase::Ended,
            (Signal::Start, SessionPhase::Menu) => SessionPhase::Running,
            (Signal::Pause, SessionPhase::Running) => SessionPhase::Paused,
            (Signal::Resume, SessionPhase::Paused) => SessionPhase::Running,
            (_, phase) => phase,
        };
        if next != self.phase {
            log::info!("Session {:?} -> {:?} (score {}, {}s)", self.phase, next, self.score, self.elapsed_seconds);
            self.phase = next;
        }
    }

    /// Advance both timers by `dt` at the given player speed
    pub fn advance(&mut self, player_speed: f32, dt: f32) {
        if !self.is_running() {
            return;
        }
        let increment = self.score_increment(player_speed);
        for _ in 0..self.score_timer.advance(dt) {
            self.score += increment;
        }
        self.elapsed_seconds += self.elapsed_timer.advance(dt);
    }
}

impl Tickable for SessionState {
    fn update(&mut self, frame: &mut Frame<'_>) {
        if frame.input.start && self.phase == SessionPhase::Menu {
            frame.request(Signal::Start);
        }
        if frame.input.toggle_pause {
            if let Some(signal) = self.pause_toggle_request() {
                frame.request(signal);
            }
        }
        self.advance(frame.player_speed, frame.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn running() -> SessionState {
        let mut session = SessionState::new(&Tuning::default());
        session.on_signal(Signal::Start);
        session
    }

    #[test]
    fn test_menu_does_not_tick() {
        let mut session = SessionState::new(&Tuning::default());
        session.advance(100.0, 5.0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    #[test]
    fn test_score_and_elapsed_timers() {
        let mut session = running();
        for _ in 0..60 {
            session.advance(20.0, DT);
        }
        // 4 score ticks of 5 + round(0.1 * 20)
        assert_eq!(session.score(), 28);
        assert_eq!(session.elapsed_seconds(), 1);
    }

    #[test]
    fn test_score_increment_rounds_speed_bonus() {
        let session = running();
        assert_eq!(session.score_increment(0.0), 5);
        assert_eq!(session.score_increment(14.0), 6);
        assert_eq!(session.score_increment(15.0), 7);
    }

    #[test]
    fn test_pause_stops_timers() {
        let mut session = running();
        session.on_signal(Signal::Pause);
        session.advance(50.0, 10.0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.elapsed_seconds(), 0);
        session.on_signal(Signal::Resume);
        assert!(session.is_running());
    }

    #[test]
    fn test_pickup_score_factor() {
        let mut session = running();
        session.score = 100;
        session.apply_score_factor(1.05);
        assert_eq!(session.score(), 105);

        session.score = 101;
        session.apply_score_factor(1.05);
        assert_eq!(session.score(), 106);
    }

    #[test]
    fn test_toggle_requests() {
        let mut session = SessionState::new(&Tuning::default());
        assert_eq!(session.pause_toggle_request(), None);
        session.on_signal(Signal::Start);
        assert_eq!(session.pause_toggle_request(), Some(Signal::Pause));
        session.on_signal(Signal::Pause);
        assert_eq!(session.pause_toggle_request(), Some(Signal::Resume));
        session.on_signal(Signal::End);
        assert_eq!(session.pause_toggle_request(), None);
    }

    #[test]
    fn test_end_is_terminal() {
        let mut session = running();
        session.on_signal(Signal::End);
        session.on_signal(Signal::Resume);
        session.on_signal(Signal::Start);
        assert!(session.is_ended());
        session.advance(10.0, 10.0);
        assert_eq!(session.elapsed_seconds(), 0);
    }

    proptest! {
        #[test]
        fn prop_pickup_is_rounded_product(score in 0u64..1_000_000) {
            let mut session = running();
            session.score = score;
            session.apply_score_factor(1.05);
            prop_assert_eq!(session.score(), (score as f64 * 1.05).round() as u64);
        }
    }
}
