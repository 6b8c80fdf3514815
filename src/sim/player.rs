//! The player ship
//!
//! Flies forward at an accelerating speed, turns from two input axes, and
//! carries a hull that collisions wear down. After a damaging hit the ship
//! is briefly invincible. Contact callbacks come from the game's contact
//! tracker, never from the ship itself.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::events::Signal;
use super::field::{FieldKind, ObjectId};
use super::population::Anchor;
use super::tick::{Frame, Tickable};
use super::timer::{OneShotTimer, RepeatingTimer};
use crate::consts::{FORWARD, MAX_HULL};
use crate::difficulty_scalar;
use crate::tuning::Tuning;

/// Player lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPhase {
    /// Waiting at the menu, not moving
    Menu,
    /// Flying
    Active,
    Paused,
    /// Run over; only a fresh game leaves this phase
    Ended,
}

/// Result of overlapping a powerup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupEffect {
    /// Multiply the session score by this
    pub score_factor: f64,
    pub hull_after: f32,
}

/// The player-controlled ship
#[derive(Debug, Clone)]
pub struct PlayerAgent {
    pub position: Vec3,
    pub orientation: Quat,
    /// Impulse-driven drift on top of forward flight
    pub knock_velocity: Vec3,
    pub knock_angular_velocity: Vec3,
    pub speed: f32,
    pub max_speed: f32,
    hull: f32,
    invincible: bool,
    phase: PlayerPhase,
    difficulty: f32,
    end_requested: bool,
    acceleration_timer: RepeatingTimer,
    invincibility_timer: OneShotTimer,
    /// Powerups touched and waiting for overlap end
    marked_pickups: Vec<ObjectId>,
    tuning: Tuning,
}

impl PlayerAgent {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            knock_velocity: Vec3::ZERO,
            knock_angular_velocity: Vec3::ZERO,
            speed: tuning.player_base_speed,
            max_speed: tuning.player_base_max_speed,
            hull: MAX_HULL,
            invincible: false,
            phase: PlayerPhase::Menu,
            difficulty: 1.0,
            end_requested: false,
            acceleration_timer: RepeatingTimer::new(tuning.acceleration_period),
            invincibility_timer: OneShotTimer::new(),
            marked_pickups: Vec::new(),
            tuning: tuning.clone(),
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    /// Hull strength in [0, 100]
    pub fn hull(&self) -> f32 {
        self.hull
    }

    pub fn hull_percent(&self) -> f32 {
        self.hull / MAX_HULL * 100.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Seconds until invincibility clears, if a clear is pending
    pub fn invincibility_remaining(&self) -> Option<f32> {
        self.invincibility_timer.remaining()
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn radius(&self) -> f32 {
        self.tuning.player_radius
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * FORWARD
    }

    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.position, self.orientation)
    }

    pub fn on_signal(&mut self, signal: Signal) {
        self.phase = match (signal, self.phase) {
            (_, PlayerPhase::Ended) => PlayerPhase::Ended,
            (Signal::End, _) => PlayerPhase::Ended,
            (Signal::Start, PlayerPhase::Menu) => PlayerPhase::Active,
            (Signal::Pause, PlayerPhase::Active) => PlayerPhase::Paused,
            (Signal::Resume, PlayerPhase::Paused) => PlayerPhase::Active,
            (_, phase) => phase,
        };
    }

    /// Speed-up step, run once per acceleration period
    fn accelerate(&mut self) {
        self.max_speed = (self.max_speed * self.difficulty).min(self.tuning.player_max_speed_ceiling);
        self.speed = (self.speed + self.tuning.player_acceleration).min(self.max_speed);
    }

    /// Advance flight by `dt`. Returns true the first time the hull is found depleted.
    pub fn step(&mut self, horizontal: f32, vertical: f32, elapsed_seconds: u32, dt: f32) -> bool {
        if self.phase != PlayerPhase::Active {
            return false;
        }

        self.difficulty = difficulty_scalar(elapsed_seconds, self.tuning.difficulty_per_second);

        for _ in 0..self.acceleration_timer.advance(dt) {
            self.accelerate();
        }

        if self.invincibility_timer.advance(dt) {
            self.invincible = false;
            log::debug!("Invincibility cleared");
        }

        // Yaw around local up, pitch around local right
        let turn = self.tuning.player_turn_rate.to_radians() * dt;
        let yaw = Quat::from_rotation_y(-horizontal * turn);
        let pitch = Quat::from_rotation_x(-vertical * turn);
        self.orientation = (self.orientation * yaw * pitch).normalize();

        let spin = self.knock_angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            self.orientation = (Quat::from_scaled_axis(spin) * self.orientation).normalize();
        }

        self.position += self.forward() * self.speed * dt + self.knock_velocity * dt;

        if self.hull <= 0.0 && !self.end_requested {
            self.end_requested = true;
            log::info!("Hull depleted");
            return true;
        }
        false
    }

    /// Solid contact began: kick away from the contact point
    pub fn on_collision_enter(&mut self, contact_point: Vec3) {
        if self.phase == PlayerPhase::Ended {
            return;
        }
        let toward_contact = (contact_point - self.position).normalize_or_zero();
        self.knock_velocity += toward_contact * self.tuning.bounce_multiplier;
        self.knock_angular_velocity += Vec3::from_array(self.tuning.impact_spin);
    }

    /// Solid contact ended: settle and take damage unless invincible
    pub fn on_collision_exit(&mut self) {
        self.knock_velocity = Vec3::ZERO;
        self.knock_angular_velocity = Vec3::ZERO;

        if self.phase == PlayerPhase::Ended {
            return;
        }

        // The window runs from the damaging hit; bumps inside it neither hurt nor extend it
        if self.invincible {
            return;
        }

        self.hull = (self.hull - self.tuning.hull_damage).max(0.0);
        self.speed *= 0.5;
        self.speed -= self.speed * 0.9;
        self.max_speed = self.tuning.player_base_max_speed;
        self.invincible = true;
        self.invincibility_timer.arm(self.tuning.invincibility_seconds);
        log::debug!("Hit: hull {:.0}, speed {:.1}", self.hull, self.speed);
    }

    /// Trigger overlap began
    pub fn on_overlap_begin(&mut self, id: ObjectId, kind: FieldKind) -> Option<PickupEffect> {
        if kind != FieldKind::Powerup || self.phase == PlayerPhase::Ended {
            return None;
        }
        if self.marked_pickups.contains(&id) {
            return None;
        }
        self.hull = (self.hull + self.tuning.pickup_hull).min(MAX_HULL);
        self.marked_pickups.push(id);
        log::debug!("Picked up {:?}: hull {:.0}", id, self.hull);
        Some(PickupEffect {
            score_factor: self.tuning.pickup_score_factor,
            hull_after: self.hull,
        })
    }

    /// Trigger overlap ended. Returns true if the object was a collected
    /// powerup and should now be destroyed.
    pub fn on_overlap_end(&mut self, id: ObjectId) -> bool {
        match self.marked_pickups.iter().position(|m| *m == id) {
            Some(i) => {
                self.marked_pickups.swap_remove(i);
                true
            }
            None => false,
        }
    }
}

impl Tickable for PlayerAgent {
    fn update(&mut self, frame: &mut Frame<'_>) {
        let input = frame.input.sanitized();
        if self.step(input.horizontal, input.vertical, frame.elapsed_seconds, frame.dt) {
            frame.request(Signal::End);
        }
        frame.anchor = self.anchor();
        frame.player_speed = self.speed;
    }
}
