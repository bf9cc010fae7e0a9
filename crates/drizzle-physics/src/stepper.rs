//! Per-frame simulation step: wind, damping, integration, collision report

use crate::boundary::BoundaryManager;
use crate::wind::Wind;
use crate::world::PhysicsWorld;
use drizzle_core::{OverlayConfig, OverlayRng};
use rapier2d::prelude::*;

/// Outcome of one physics step
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    /// Time slice actually simulated, in seconds
    pub dt: f32,
    /// Bodies that started touching the floor during this step
    pub floor_contacts: Vec<RigidBodyHandle>,
    /// Horizontal wind acceleration applied this step
    pub wind: f32,
}

/// Advances the simulation once per rendered frame
pub struct PhysicsStepper {
    wind: Wind,
    rng: OverlayRng,
}

impl PhysicsStepper {
    pub fn new(seed: u32) -> Self {
        Self {
            wind: Wind::new(),
            rng: OverlayRng::new(seed),
        }
    }

    /// Clamp a raw frame delta to the target frame interval.
    ///
    /// Long stalls would otherwise produce one huge step and let particles
    /// tunnel through the floor.
    pub fn clamp_dt(config: &OverlayConfig, raw_dt: f32) -> f32 {
        if !raw_dt.is_finite() || raw_dt <= 0.0 {
            return 0.0;
        }
        raw_dt.min(config.target_frame_interval())
    }

    /// Fraction of velocity kept after air resistance and damping over `dt`
    pub fn velocity_retention(config: &OverlayConfig, dt: f32) -> f32 {
        let per_frame = ((1.0 - config.physics_air) * (1.0 - config.physics_damping)).clamp(0.0, 1.0);
        per_frame.powf(dt * 60.0)
    }

    /// Visual rotation added on top of the physics rotation over `dt`
    pub fn spin_increment(config: &OverlayConfig, dt: f32) -> f32 {
        config.emoji_rotation_speed * dt * 60.0
    }

    /// Apply environmental forces to `bodies`, step the world and report
    /// fresh floor contacts
    pub fn step(
        &mut self,
        world: &mut PhysicsWorld,
        boundaries: &BoundaryManager,
        bodies: &[RigidBodyHandle],
        config: &OverlayConfig,
        raw_dt: f32,
    ) -> StepReport {
        let dt = Self::clamp_dt(config, raw_dt);
        if dt <= 0.0 {
            return StepReport::default();
        }

        world.set_gravity_scale(config.physics_gravity_y);
        let wind = self.wind.sample(config, &mut self.rng, dt);
        let retention = Self::velocity_retention(config, dt);

        for &handle in bodies {
            let Some(body) = world.get_rigid_body_mut(handle) else {
                continue;
            };
            if wind != 0.0 {
                let impulse = wind * body.mass() * dt;
                body.apply_impulse(Vector::new(impulse, 0.0), true);
            }
            if retention < 1.0 {
                let v = *body.linvel();
                body.set_linvel(v * retention, false);
            }
        }

        world.step(dt);

        let mut floor_contacts = Vec::new();
        for event in world.drain_collision_events() {
            let CollisionEvent::Started(a, b, _) = event else {
                continue;
            };
            let other = if boundaries.is_floor(a) {
                b
            } else if boundaries.is_floor(b) {
                a
            } else {
                continue;
            };
            if let Some(body) = world.collider_parent(other) {
                floor_contacts.push(body);
            }
        }

        StepReport {
            dt,
            floor_contacts,
            wind,
        }
    }
}

impl Default for PhysicsStepper {
    fn default() -> Self {
        Self::new(0x5EED_CAFE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::ParticleBody;
    use drizzle_core::Vec2;

    fn drop_ball(world: &mut PhysicsWorld, config: &OverlayConfig, x: f32, y: f32) -> ParticleBody {
        ParticleBody::insert(world, Vec2::new(x, y), 40.0, Vec2::ZERO, 0.0, config)
    }

    #[test]
    fn test_clamp_dt() {
        let config = OverlayConfig::default();
        assert_eq!(PhysicsStepper::clamp_dt(&config, 0.0), 0.0);
        assert_eq!(PhysicsStepper::clamp_dt(&config, f32::NAN), 0.0);
        assert!((PhysicsStepper::clamp_dt(&config, 0.005) - 0.005).abs() < 1e-7);
        assert!((PhysicsStepper::clamp_dt(&config, 2.0) - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn test_velocity_retention() {
        let config = OverlayConfig {
            physics_air: 0.1,
            physics_damping: 0.0,
            ..Default::default()
        };
        assert!((PhysicsStepper::velocity_retention(&config, 1.0 / 60.0) - 0.9).abs() < 1e-5);
        assert!((PhysicsStepper::velocity_retention(&config, 2.0 / 60.0) - 0.81).abs() < 1e-5);

        let still = OverlayConfig {
            physics_air: 0.0,
            ..Default::default()
        };
        assert!((PhysicsStepper::velocity_retention(&still, 1.0 / 60.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_delta_does_not_step() {
        let config = OverlayConfig::default();
        let mut world = PhysicsWorld::new();
        let boundaries = BoundaryManager::new(&mut world, &config);
        let ball = drop_ball(&mut world, &config, 300.0, 100.0);
        let mut stepper = PhysicsStepper::default();

        let report = stepper.step(&mut world, &boundaries, &[ball.body], &config, 0.0);
        assert_eq!(report.dt, 0.0);
        assert_eq!(ball.pose(&world).unwrap().position, Vec2::new(300.0, 100.0));
    }

    #[test]
    fn test_floor_contact_reported() {
        let config = OverlayConfig::default();
        let mut world = PhysicsWorld::new();
        let boundaries = BoundaryManager::new(&mut world, &config);
        let ball = drop_ball(&mut world, &config, 640.0, 600.0);
        let mut stepper = PhysicsStepper::default();

        let mut contacts = Vec::new();
        for _ in 0..120 {
            let report = stepper.step(&mut world, &boundaries, &[ball.body], &config, 1.0 / 60.0);
            contacts.extend(report.floor_contacts);
        }
        assert!(contacts.contains(&ball.body));

        let pose = ball.pose(&world).unwrap();
        assert!(pose.position.y <= 720.0);
    }

    #[test]
    fn test_wind_pushes_sideways() {
        let config = OverlayConfig {
            wind_enabled: true,
            wind_strength: 100.0,
            wind_direction: drizzle_core::WindDirection::Right,
            physics_gravity_y: 0.0,
            physics_air: 0.0,
            ..Default::default()
        };
        let mut world = PhysicsWorld::new();
        let boundaries = BoundaryManager::new(&mut world, &config);
        let ball = drop_ball(&mut world, &config, 300.0, 300.0);
        let mut stepper = PhysicsStepper::default();

        for _ in 0..30 {
            stepper.step(&mut world, &boundaries, &[ball.body], &config, 1.0 / 60.0);
        }
        assert!(ball.pose(&world).unwrap().position.x > 300.0);
    }
}
