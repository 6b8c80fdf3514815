//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads comes through [`Tuning`].
//! Defaults mirror [`crate::consts`]; a JSON file may override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{GameError, GameResult};

/// Field population tuning for one kind of field object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    /// Desired steady-state population
    pub target_count: usize,
    /// Distance ahead of the player where forward spawns are placed
    pub spawn_distance: f32,
    /// Half-size of the cube around the player outside which objects may despawn
    pub despawn_distance: f32,
    /// Radius band for the initial fill
    pub fill_min_radius: f32,
    pub fill_max_radius: f32,
    /// Per-axis random rotation (degrees) for spawn positions and velocities
    pub spread_degrees: f32,
    /// Per-axis velocity magnitude range
    pub min_speed: f32,
    pub max_speed: f32,
    /// Forward-spawn candidates tried per tick
    pub max_spawn_attempts: u32,
    /// Collision radius at scale 1.0
    pub radius: f32,
}

impl FieldTuning {
    pub fn asteroids() -> Self {
        Self {
            target_count: ASTEROID_TARGET_COUNT,
            spawn_distance: SPAWN_DISTANCE,
            despawn_distance: DESPAWN_DISTANCE,
            fill_min_radius: FILL_MIN_RADIUS,
            fill_max_radius: FILL_MAX_RADIUS,
            spread_degrees: SPAWN_SPREAD_DEGREES,
            min_speed: FIELD_MIN_SPEED,
            max_speed: FIELD_MAX_SPEED,
            max_spawn_attempts: MAX_SPAWN_ATTEMPTS,
            radius: ASTEROID_RADIUS,
        }
    }

    pub fn powerups() -> Self {
        Self {
            target_count: POWERUP_TARGET_COUNT,
            radius: POWERUP_RADIUS,
            ..Self::asteroids()
        }
    }

    fn validate(&self, prefix: &'static str) -> GameResult<()> {
        positive(prefix, self.spawn_distance)?;
        positive(prefix, self.despawn_distance)?;
        positive(prefix, self.radius)?;
        if self.fill_min_radius < 0.0 || self.fill_max_radius < self.fill_min_radius {
            return Err(GameError::InvalidTuning {
                name: prefix,
                value: self.fill_max_radius as f64,
                reason: "fill radius band must satisfy 0 <= min <= max",
            });
        }
        if self.min_speed < 0.0 || self.max_speed < self.min_speed {
            return Err(GameError::InvalidTuning {
                name: prefix,
                value: self.max_speed as f64,
                reason: "speed range must satisfy 0 <= min <= max",
            });
        }
        if self.max_spawn_attempts == 0 {
            return Err(GameError::InvalidTuning {
                name: prefix,
                value: 0.0,
                reason: "max_spawn_attempts must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self::asteroids()
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub asteroids: FieldTuning,
    pub powerups: FieldTuning,
    /// Seconds after start before powerups begin spawning
    pub powerup_warmup_seconds: u32,
    /// Powerup spawns when a draw from [1, 100) is at least this value
    pub powerup_spawn_threshold: u32,
    pub asteroid_base_scale: f32,

    // === Player ===
    pub player_base_speed: f32,
    pub player_base_max_speed: f32,
    pub player_max_speed_ceiling: f32,
    pub player_acceleration: f32,
    /// Degrees per second at full deflection
    pub player_turn_rate: f32,
    pub player_radius: f32,
    pub bounce_multiplier: f32,
    pub impact_spin: [f32; 3],

    // === Hull ===
    pub hull_damage: f32,
    pub pickup_hull: f32,
    pub pickup_score_factor: f64,
    pub invincibility_seconds: f32,

    // === Timers ===
    pub acceleration_period: f32,
    pub score_period: f32,
    pub elapsed_period: f32,

    // === Scoring / difficulty ===
    pub score_base_increment: u64,
    pub score_speed_factor: f32,
    pub difficulty_per_second: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            asteroids: FieldTuning::asteroids(),
            powerups: FieldTuning::powerups(),
            powerup_warmup_seconds: POWERUP_WARMUP_SECONDS,
            powerup_spawn_threshold: POWERUP_SPAWN_THRESHOLD,
            asteroid_base_scale: ASTEROID_BASE_SCALE,

            player_base_speed: PLAYER_BASE_SPEED,
            player_base_max_speed: PLAYER_BASE_MAX_SPEED,
            player_max_speed_ceiling: PLAYER_MAX_SPEED_CEILING,
            player_acceleration: PLAYER_ACCELERATION,
            player_turn_rate: PLAYER_TURN_RATE,
            player_radius: PLAYER_RADIUS,
            bounce_multiplier: BOUNCE_MULTIPLIER,
            impact_spin: IMPACT_SPIN.to_array(),

            hull_damage: HULL_DAMAGE,
            pickup_hull: PICKUP_HULL,
            pickup_score_factor: PICKUP_SCORE_FACTOR,
            invincibility_seconds: INVINCIBILITY_SECONDS,

            acceleration_period: ACCELERATION_PERIOD,
            score_period: SCORE_PERIOD,
            elapsed_period: ELAPSED_PERIOD,

            score_base_increment: SCORE_BASE_INCREMENT,
            score_speed_factor: SCORE_SPEED_FACTOR,
            difficulty_per_second: DIFFICULTY_PER_SECOND,
        }
    }
}

impl Tuning {
    /// Parse from JSON; missing keys keep their defaults
    pub fn from_json_str(json: &str) -> GameResult<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> GameResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> GameResult<()> {
        self.asteroids.validate("asteroids")?;
        self.powerups.validate("powerups")?;

        positive("acceleration_period", self.acceleration_period)?;
        positive("score_period", self.score_period)?;
        positive("elapsed_period", self.elapsed_period)?;
        positive("invincibility_seconds", self.invincibility_seconds)?;
        positive("player_radius", self.player_radius)?;
        positive("asteroid_base_scale", self.asteroid_base_scale)?;

        if self.player_base_max_speed > self.player_max_speed_ceiling {
            return Err(GameError::InvalidTuning {
                name: "player_base_max_speed",
                value: self.player_base_max_speed as f64,
                reason: "must not exceed player_max_speed_ceiling",
            });
        }
        if !(1..=100).contains(&self.powerup_spawn_threshold) {
            return Err(GameError::InvalidTuning {
                name: "powerup_spawn_threshold",
                value: self.powerup_spawn_threshold as f64,
                reason: "must lie in [1, 100]",
            });
        }
        if self.hull_damage < 0.0 || self.pickup_hull < 0.0 {
            return Err(GameError::InvalidTuning {
                name: "hull_damage",
                value: self.hull_damage.min(self.pickup_hull) as f64,
                reason: "hull amounts must be non-negative",
            });
        }
        if self.difficulty_per_second < 0.0 {
            return Err(GameError::InvalidTuning {
                name: "difficulty_per_second",
                value: self.difficulty_per_second as f64,
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GameError::InvalidTuning {
            name,
            value: value as f64,
            reason: "must be positive",
        })
    }
}
