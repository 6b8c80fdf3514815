//! Contact detection between the player and field objects
//!
//! Stands in for a physics engine's callback layer: every tick the player's
//! sphere is tested against each live field object, and changes in the set
//! of touching objects become begin/end events. Asteroids are solid and
//! report collisions; powerups are triggers and report overlaps.

use glam::Vec3;

use super::field::{FieldKind, ObjectId};
use super::population::FieldPopulation;

/// A contact change for the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactEvent {
    CollisionEnter { id: ObjectId, point: Vec3 },
    CollisionExit { id: ObjectId },
    OverlapBegin { id: ObjectId, kind: FieldKind },
    OverlapEnd { id: ObjectId },
}

/// Remembers which objects touched the player last tick
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: Vec<(FieldKind, ObjectId)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_touching(&self, kind: FieldKind, id: ObjectId) -> bool {
        self.touching.contains(&(kind, id))
    }

    pub fn touching_count(&self) -> usize {
        self.touching.len()
    }

    /// Test the player sphere against every field; returns ended contacts
    /// first, then new ones, each in a stable order
    pub fn update(&mut self, center: Vec3, radius: f32, fields: &[&FieldPopulation]) -> Vec<ContactEvent> {
        let mut now: Vec<(FieldKind, ObjectId, Vec3)> = Vec::new();
        for field in fields {
            for obj in field.objects() {
                let reach = radius + field.radius_of(obj);
                let offset = center - obj.position;
                if offset.length_squared() <= reach * reach {
                    let point = obj.position + offset.normalize_or_zero() * field.radius_of(obj);
                    now.push((obj.kind, obj.id, point));
                }
            }
        }

        let mut events = Vec::new();
        for &(kind, id) in &self.touching {
            if !now.iter().any(|&(k, i, _)| k == kind && i == id) {
                events.push(match kind {
                    FieldKind::Asteroid => ContactEvent::CollisionExit { id },
                    FieldKind::Powerup => ContactEvent::OverlapEnd { id },
                });
            }
        }
        for &(kind, id, point) in &now {
            if !self.touching.contains(&(kind, id)) {
                events.push(match kind {
                    FieldKind::Asteroid => ContactEvent::CollisionEnter { id, point },
                    FieldKind::Powerup => ContactEvent::OverlapBegin { id, kind },
                });
            }
        }

        self.touching = now.into_iter().map(|(k, i, _)| (k, i)).collect();
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::field::FieldObject;
    use crate::tuning::Tuning;
    use glam::Quat;

    fn field_with(kind_asteroid: bool, position: Vec3) -> (FieldPopulation, ObjectId) {
        let tuning = Tuning::default();
        let mut field = if kind_asteroid {
            FieldPopulation::asteroids(&tuning)
        } else {
            FieldPopulation::powerups(&tuning)
        };
        let kind = field.kind();
        let id = field.insert(FieldObject::new(ObjectId(0), kind, position, Quat::IDENTITY));
        (field, id)
    }

    #[test]
    fn test_collision_enter_then_exit() {
        let (field, id) = field_with(true, Vec3::new(0.0, 0.0, 4.0));
        let mut tracker = ContactTracker::new();

        let events = tracker.update(Vec3::ZERO, 2.0, &[&field]);
        assert_eq!(events.len(), 1);
        match events[0] {
            ContactEvent::CollisionEnter { id: hit, point } => {
                assert_eq!(hit, id);
                // Surface point of the 3-unit asteroid facing the player
                assert!((point - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
            }
            other => panic!("unexpected {other:?}"),
        }

        // Still touching: no new events
        assert!(tracker.update(Vec3::ZERO, 2.0, &[&field]).is_empty());

        let events = tracker.update(Vec3::new(0.0, 0.0, -10.0), 2.0, &[&field]);
        assert_eq!(events, vec![ContactEvent::CollisionExit { id }]);
    }

    #[test]
    fn test_powerup_overlap_events() {
        let (field, id) = field_with(false, Vec3::new(1.0, 0.0, 0.0));
        let mut tracker = ContactTracker::new();
        let events = tracker.update(Vec3::ZERO, 2.0, &[&field]);
        assert_eq!(events, vec![ContactEvent::OverlapBegin { id, kind: FieldKind::Powerup }]);
        assert!(tracker.is_touching(FieldKind::Powerup, id));
    }

    #[test]
    fn test_destroyed_object_ends_contact() {
        let (mut field, id) = field_with(false, Vec3::ZERO);
        let mut tracker = ContactTracker::new();
        tracker.update(Vec3::ZERO, 2.0, &[&field]);
        field.destroy(id);
        let events = tracker.update(Vec3::ZERO, 2.0, &[&field]);
        assert_eq!(events, vec![ContactEvent::OverlapEnd { id }]);
        assert_eq!(tracker.touching_count(), 0);
    }

    #[test]
    fn test_far_objects_ignored() {
        let (field, _) = field_with(true, Vec3::new(100.0, 0.0, 0.0));
        let mut tracker = ContactTracker::new();
        assert!(tracker.update(Vec3::ZERO, 2.0, &[&field]).is_empty());
    }
}
