//! Void Runner - A 3D arcade flight through an endless asteroid field
//!
//! Core modules:
//! - `sim`: Deterministic simulation (field population, player, session, events)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Leaderboard of finished runs
//! - `error`: Library error type

pub mod error;
pub mod highscores;
pub mod sim;
pub mod tuning;

pub use error::{GameError, GameResult};
pub use highscores::HighScores;
pub use tuning::Tuning;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Local forward axis of every object
    pub const FORWARD: glam::Vec3 = glam::Vec3::Z;

    /// Field population defaults
    pub const ASTEROID_TARGET_COUNT: usize = 120;
    pub const POWERUP_TARGET_COUNT: usize = 4;
    pub const SPAWN_DISTANCE: f32 = 400.0;
    pub const DESPAWN_DISTANCE: f32 = 500.0;
    pub const FILL_MIN_RADIUS: f32 = 40.0;
    pub const FILL_MAX_RADIUS: f32 = 400.0;
    /// Maximum random rotation applied to spawn/velocity directions (degrees, per axis)
    pub const SPAWN_SPREAD_DEGREES: f32 = 45.0;
    /// Per-axis velocity magnitude range for spawned objects
    pub const FIELD_MIN_SPEED: f32 = 1.0;
    pub const FIELD_MAX_SPEED: f32 = 10.0;
    pub const ASTEROID_BASE_SCALE: f32 = 1.0;
    /// Forward-spawn candidates tried per tick before giving up until the next tick
    pub const MAX_SPAWN_ATTEMPTS: u32 = 20;
    /// Powerups spawn when a draw from [1, 100) reaches this value
    pub const POWERUP_SPAWN_THRESHOLD: u32 = 99;
    pub const POWERUP_WARMUP_SECONDS: u32 = 10;

    /// Player defaults
    pub const PLAYER_BASE_SPEED: f32 = 20.0;
    pub const PLAYER_BASE_MAX_SPEED: f32 = 40.0;
    pub const PLAYER_MAX_SPEED_CEILING: f32 = 150.0;
    pub const PLAYER_ACCELERATION: f32 = 1.0;
    /// Yaw/pitch rate in degrees per second at full input deflection
    pub const PLAYER_TURN_RATE: f32 = 90.0;
    pub const PLAYER_RADIUS: f32 = 2.0;
    /// Negative: the impulse points away from the contact
    pub const BOUNCE_MULTIPLIER: f32 = -15.0;
    /// Angular kick applied on impact (radians/s)
    pub const IMPACT_SPIN: glam::Vec3 = glam::Vec3::new(0.0, 0.0, 1.5);

    /// Hull
    pub const MAX_HULL: f32 = 100.0;
    pub const HULL_DAMAGE: f32 = 20.0;
    pub const PICKUP_HULL: f32 = 10.0;
    pub const PICKUP_SCORE_FACTOR: f64 = 1.05;
    pub const INVINCIBILITY_SECONDS: f32 = 1.0;

    /// Timer periods (seconds)
    pub const ACCELERATION_PERIOD: f32 = 0.1;
    pub const SCORE_PERIOD: f32 = 0.25;
    pub const ELAPSED_PERIOD: f32 = 1.0;

    /// Score per score tick before the speed bonus
    pub const SCORE_BASE_INCREMENT: u64 = 5;
    pub const SCORE_SPEED_FACTOR: f32 = 0.1;

    /// Difficulty scalar growth per elapsed second (1.0 at start)
    pub const DIFFICULTY_PER_SECOND: f32 = 0.002;

    /// Collision radii
    pub const ASTEROID_RADIUS: f32 = 3.0;
    pub const POWERUP_RADIUS: f32 = 1.5;
}

/// Difficulty multiplier for a run that has lasted `elapsed_seconds`
#[inline]
pub fn difficulty_scalar(elapsed_seconds: u32, per_second: f32) -> f32 {
    1.0 + elapsed_seconds as f32 * per_second
}

/// Random rotation with each euler axis drawn from [-spread, spread] degrees
pub fn random_spread_rotation<R: Rng + ?Sized>(rng: &mut R, spread_degrees: f32) -> Quat {
    let spread = spread_degrees.to_radians();
    let mut axis = || {
        if spread > 0.0 {
            rng.random_range(-spread..=spread)
        } else {
            0.0
        }
    };
    let (x, y, z) = (axis(), axis(), axis());
    Quat::from_euler(EulerRot::YXZ, y, x, z)
}

/// Uniformly distributed unit vector
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
            rng.random_range(-1.0..=1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
}

/// Per-axis offset with random sign and magnitude in [min, max]
pub fn random_band_offset<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> Vec3 {
    let mut axis = || {
        let magnitude = if max > min { rng.random_range(min..=max) } else { min };
        if rng.random::<bool>() { magnitude } else { -magnitude }
    };
    Vec3::new(axis(), axis(), axis())
}

/// Per-axis magnitudes in [min, max]
pub fn random_magnitudes<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> Vec3 {
    let mut axis = || if max > min { rng.random_range(min..=max) } else { min };
    Vec3::new(axis(), axis(), axis())
}

/// True if `point` lies outside the axis-aligned cube of half-size `half_extent` around `center`
#[inline]
pub fn outside_cube(point: Vec3, center: Vec3, half_extent: f32) -> bool {
    (point - center).abs().max_element() > half_extent
}
