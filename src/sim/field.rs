//! Field objects: asteroids and powerups drifting around the player

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Stable identity of a spawned field object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// What a field object is (the tag the player reacts to)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Solid body the player collides with
    Asteroid,
    /// Trigger volume the player picks up
    Powerup,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Asteroid => "asteroid",
            FieldKind::Powerup => "powerup",
        }
    }

    /// Whether elapsed-time difficulty scales this kind's speed and size
    pub fn scales_with_difficulty(&self) -> bool {
        matches!(self, FieldKind::Asteroid)
    }
}

/// A drifting field entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldObject {
    pub id: ObjectId,
    pub kind: FieldKind,
    pub position: Vec3,
    pub orientation: Quat,
    /// Velocity assigned at spawn; preserved while paused
    pub velocity: Vec3,
    /// Unit rotation axis times rate (radians/s); preserved while paused
    pub angular_velocity: Vec3,
    /// Size multiplier (collision radius scales with it)
    pub scale: f32,
    /// False once destroyed; dead entries are pruned on the next pass
    pub alive: bool,
    /// False while paused
    pub moving: bool,
}

impl FieldObject {
    pub fn new(id: ObjectId, kind: FieldKind, position: Vec3, orientation: Quat) -> Self {
        Self {
            id,
            kind,
            position,
            orientation,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            scale: 1.0,
            alive: true,
            moving: true,
        }
    }

    /// Velocity actually applied this tick
    pub fn effective_velocity(&self) -> Vec3 {
        if self.moving { self.velocity } else { Vec3::ZERO }
    }

    pub fn effective_angular_velocity(&self) -> Vec3 {
        if self.moving {
            self.angular_velocity
        } else {
            Vec3::ZERO
        }
    }

    /// Integrate position and orientation
    pub fn integrate(&mut self, dt: f32) {
        if !self.alive || !self.moving {
            return;
        }
        self.position += self.velocity * dt;
        let spin = self.angular_velocity * dt;
        if spin.length_squared() > 0.0 {
            self.orientation = (Quat::from_scaled_axis(spin) * self.orientation).normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrate_moves_along_velocity() {
        let mut obj = FieldObject::new(ObjectId(1), FieldKind::Asteroid, Vec3::ZERO, Quat::IDENTITY);
        obj.velocity = Vec3::new(1.0, 2.0, 3.0);
        obj.integrate(0.5);
        assert!((obj.position - Vec3::new(0.5, 1.0, 1.5)).length() < 1e-6);
    }

    #[test]
    fn test_stopped_object_keeps_velocity() {
        let mut obj = FieldObject::new(ObjectId(1), FieldKind::Powerup, Vec3::ZERO, Quat::IDENTITY);
        obj.velocity = Vec3::X;
        obj.moving = false;
        obj.integrate(1.0);
        assert_eq!(obj.position, Vec3::ZERO);
        assert_eq!(obj.effective_velocity(), Vec3::ZERO);
        assert_eq!(obj.velocity, Vec3::X);
    }

    #[test]
    fn test_only_asteroids_scale_with_difficulty() {
        assert!(FieldKind::Asteroid.scales_with_difficulty());
        assert!(!FieldKind::Powerup.scales_with_difficulty());
    }
}
