//! Visibility queries
//!
//! The population manager never spawns forward objects the observer can't
//! see, and only despawns objects the observer can't see. Anything that can
//! answer "is this point on screen" implements [`Viewport`].

use glam::{Mat4, Quat, Vec3, Vec4};

use super::population::Anchor;
use crate::consts::FORWARD;

pub trait Viewport {
    /// True if `world_pos` projects inside the view volume
    fn is_visible(&self, world_pos: Vec3) -> bool;

    /// Move with the player; called each step after the player has flown
    fn track(&mut self, _anchor: &Anchor) {}
}

/// Everything is on screen
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl Viewport for AlwaysVisible {
    fn is_visible(&self, _world_pos: Vec3) -> bool {
        true
    }
}

/// Nothing is on screen
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverVisible;

impl Viewport for NeverVisible {
    fn is_visible(&self, _world_pos: Vec3) -> bool {
        false
    }
}

impl<F: Fn(Vec3) -> bool> Viewport for F {
    fn is_visible(&self, world_pos: Vec3) -> bool {
        self(world_pos)
    }
}

/// Perspective camera trailing behind the player
#[derive(Debug, Clone)]
pub struct ChaseCamera {
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Offset from the target in the target's local frame
    pub offset: Vec3,
    view_proj: Mat4,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self::new(60f32.to_radians(), 16.0 / 9.0, 0.3, 1000.0)
    }
}

impl ChaseCamera {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_y,
            aspect,
            near,
            far,
            offset: Vec3::new(0.0, 3.0, -10.0),
            view_proj: Mat4::IDENTITY,
        };
        camera.follow(Vec3::ZERO, Quat::IDENTITY);
        camera
    }

    /// Place the camera behind a target at `position` facing along `orientation`
    pub fn follow(&mut self, position: Vec3, orientation: Quat) {
        let eye = position + orientation * self.offset;
        let dir = orientation * FORWARD;
        let up = orientation * Vec3::Y;
        let view = Mat4::look_to_rh(eye, dir, up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far);
        self.view_proj = proj * view;
    }

    /// Project into viewport space: x, y in [0,1] across the screen, z is depth in [0,1]
    pub fn world_to_viewport(&self, world_pos: Vec3) -> Option<Vec3> {
        let clip = self.view_proj * Vec4::new(world_pos.x, world_pos.y, world_pos.z, 1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec3::new(ndc.x * 0.5 + 0.5, ndc.y * 0.5 + 0.5, ndc.z))
    }
}

impl Viewport for ChaseCamera {
    fn is_visible(&self, world_pos: Vec3) -> bool {
        match self.world_to_viewport(world_pos) {
            Some(p) => (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y) && (0.0..=1.0).contains(&p.z),
            None => false,
        }
    }

    fn track(&mut self, anchor: &Anchor) {
        self.follow(anchor.position, anchor.orientation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_ahead_is_visible() {
        let camera = ChaseCamera::default();
        assert!(camera.is_visible(Vec3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn test_point_behind_is_hidden() {
        let camera = ChaseCamera::default();
        assert!(!camera.is_visible(Vec3::new(0.0, 0.0, -100.0)));
    }

    #[test]
    fn test_point_far_off_axis_is_hidden() {
        let camera = ChaseCamera::default();
        assert!(!camera.is_visible(Vec3::new(500.0, 0.0, 50.0)));
    }

    #[test]
    fn test_point_beyond_far_plane_is_hidden() {
        let camera = ChaseCamera::default();
        assert!(!camera.is_visible(Vec3::new(0.0, 0.0, 2000.0)));
    }

    #[test]
    fn test_follow_turns_with_target() {
        let mut camera = ChaseCamera::default();
        // Yaw 180 degrees: forward is now -Z
        camera.follow(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI));
        assert!(camera.is_visible(Vec3::new(0.0, 0.0, -100.0)));
        assert!(!camera.is_visible(Vec3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn test_track_moves_camera_with_anchor() {
        let mut camera = ChaseCamera::default();
        let ahead = Vec3::new(0.0, 0.0, 5_000.0);
        assert!(!camera.is_visible(ahead + Vec3::Z * 100.0));
        camera.track(&Anchor::new(ahead, Quat::IDENTITY));
        assert!(camera.is_visible(ahead + Vec3::Z * 100.0));
        assert!(!camera.is_visible(Vec3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn test_closure_viewport() {
        let only_positive_x = |p: Vec3| p.x > 0.0;
        assert!(only_positive_x.is_visible(Vec3::X));
        assert!(!only_positive_x.is_visible(-Vec3::X));
    }
}
