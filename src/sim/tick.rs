//! Per-tick scheduling interface
//!
//! Every component that advances with time implements [`Tickable`]. The
//! [`Game`](super::game::Game) builds a [`Frame`] for each fixed step and hands
//! it to each component in a fixed order. Components never publish signals
//! directly; they queue requests on the frame and the game publishes them
//! once every component has run.

use rand_pcg::Pcg32;

use super::events::Signal;
use super::population::Anchor;
use super::view::Viewport;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Yaw axis in [-1, 1]
    pub horizontal: f32,
    /// Pitch axis in [-1, 1]
    pub vertical: f32,
    /// Pause/resume toggle (edge-triggered)
    pub toggle_pause: bool,
    /// Leave the menu and start the run
    pub start: bool,
}

impl TickInput {
    /// Clamp axes into [-1, 1]; non-finite values read as centered
    pub fn sanitized(&self) -> Self {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        Self {
            horizontal: axis(self.horizontal),
            vertical: axis(self.vertical),
            ..self.clone()
        }
    }
}

/// Shared per-tick context
pub struct Frame<'a> {
    pub input: &'a TickInput,
    pub dt: f32,
    /// Session seconds elapsed at the start of this tick
    pub elapsed_seconds: u32,
    /// Player speed, refreshed after the player moves
    pub player_speed: f32,
    /// Player pose, refreshed after the player moves
    pub anchor: Anchor,
    pub view: &'a dyn Viewport,
    pub rng: &'a mut Pcg32,
    requests: Vec<Signal>,
}

impl<'a> Frame<'a> {
    pub fn new(
        input: &'a TickInput,
        dt: f32,
        elapsed_seconds: u32,
        player_speed: f32,
        anchor: Anchor,
        view: &'a dyn Viewport,
        rng: &'a mut Pcg32,
    ) -> Self {
        Self {
            input,
            dt,
            elapsed_seconds,
            player_speed,
            anchor,
            view,
            rng,
            requests: Vec::new(),
        }
    }

    /// Ask for `signal` to be published after this tick
    pub fn request(&mut self, signal: Signal) {
        if !self.requests.contains(&signal) {
            self.requests.push(signal);
        }
    }

    pub fn requests(&self) -> &[Signal] {
        &self.requests
    }

    pub fn take_requests(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.requests)
    }
}

/// Something advanced once per fixed step
pub trait Tickable {
    fn update(&mut self, frame: &mut Frame<'_>);
}
