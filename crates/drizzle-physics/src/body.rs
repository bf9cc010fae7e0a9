//! Dynamic bodies backing individual particles

use crate::world::PhysicsWorld;
use drizzle_core::{OverlayConfig, Vec2};
use rapier2d::prelude::*;

/// Handles of one particle's body and collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleBody {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Position and rotation of a body as reported by the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec2,
    pub angle: f32,
}

impl ParticleBody {
    /// Insert a ball-shaped dynamic body for a particle of diameter `size`
    pub fn insert(
        world: &mut PhysicsWorld,
        position: Vec2,
        size: f32,
        velocity: Vec2,
        angular_velocity: f32,
        config: &OverlayConfig,
    ) -> Self {
        let body = world.insert_rigid_body(
            RigidBodyBuilder::dynamic()
                .translation(Vector::new(position.x, position.y))
                .linvel(Vector::new(velocity.x, velocity.y))
                .angvel(angular_velocity)
                .ccd_enabled(true)
                .build(),
        );
        let collider = world.insert_collider_with_parent(
            ColliderBuilder::ball((size / 2.0).max(0.5))
                .restitution(config.physics_restitution)
                .friction(config.physics_friction)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            body,
        );
        Self { body, collider }
    }

    /// Current pose, or None if the body was released
    pub fn pose(&self, world: &PhysicsWorld) -> Option<BodyPose> {
        world.get_rigid_body(self.body).map(|b| {
            let t = b.translation();
            BodyPose {
                position: Vec2::new(t.x, t.y),
                angle: b.rotation().angle(),
            }
        })
    }

    /// Re-apply restitution and friction after a configuration change
    pub fn apply_material(&self, world: &mut PhysicsWorld, restitution: f32, friction: f32) {
        if let Some(collider) = world.collider_set.get_mut(self.collider) {
            collider.set_restitution(restitution);
            collider.set_friction(friction);
        }
    }

    /// Release the body and its collider. Returns false if already released.
    pub fn release(&self, world: &mut PhysicsWorld) -> bool {
        world.remove_rigid_body(self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_pose() {
        let mut world = PhysicsWorld::new();
        let body = ParticleBody::insert(
            &mut world,
            Vec2::new(100.0, -20.0),
            40.0,
            Vec2::ZERO,
            0.0,
            &OverlayConfig::default(),
        );
        let pose = body.pose(&world).unwrap();
        assert_eq!(pose.position, Vec2::new(100.0, -20.0));
        assert_eq!(world.collider_parent(body.collider), Some(body.body));

        let radius = world
            .collider_set
            .get(body.collider)
            .and_then(|c| c.shape().as_ball())
            .map(|b| b.radius)
            .unwrap();
        assert!((radius - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_release_twice() {
        let mut world = PhysicsWorld::new();
        let body = ParticleBody::insert(
            &mut world,
            Vec2::ZERO,
            10.0,
            Vec2::ZERO,
            0.0,
            &OverlayConfig::default(),
        );
        assert!(body.release(&mut world));
        assert!(!body.release(&mut world));
        assert!(body.pose(&world).is_none());
    }
}
