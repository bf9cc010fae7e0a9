//! Particle record: physics handles, render handle and lifecycle flags

use crate::surface::SpriteHandle;
use drizzle_core::{ParticleId, Vec2};
use drizzle_physics::ParticleBody;

/// One spawned visual + physics unit
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    pub body: ParticleBody,
    /// None when the surface could not create a sprite; such particles still
    /// simulate but are skipped at render time
    pub sprite: Option<SpriteHandle>,
    pub symbol: String,
    /// Diameter in pixels
    pub size: f32,
    /// Center position as last reported by the simulation
    pub position: Vec2,
    /// Rotation reported by the simulation (radians)
    pub physics_angle: f32,
    /// Extra visual rotation accumulated from the configured spin speed
    pub spin: f32,
    pub spawned_at_ms: f64,
    pub fading: bool,
    pub fade_started_ms: Option<f64>,
    /// The one-shot floor bounce effect has fired
    pub bounce_triggered: bool,
    /// The bounce effect is currently showing
    pub bouncing: bool,
    pub color_override: Option<String>,
    pub username: Option<String>,
    pub theme_refreshed_ms: Option<f64>,
    pub theme_filter: Option<String>,
}

impl Particle {
    pub fn new(id: ParticleId, body: ParticleBody, symbol: String, size: f32, position: Vec2, now_ms: f64) -> Self {
        Self {
            id,
            body,
            sprite: None,
            symbol,
            size,
            position,
            physics_angle: 0.0,
            spin: 0.0,
            spawned_at_ms: now_ms,
            fading: false,
            fade_started_ms: None,
            bounce_triggered: false,
            bouncing: false,
            color_override: None,
            username: None,
            theme_refreshed_ms: None,
            theme_filter: None,
        }
    }

    /// Total visual rotation in radians
    pub fn rotation(&self) -> f32 {
        self.physics_angle + self.spin
    }

    pub fn age_ms(&self, now_ms: f64) -> f64 {
        (now_ms - self.spawned_at_ms).max(0.0)
    }

    /// Opacity in [0, 1]; ramps down linearly across the fade
    pub fn opacity(&self, now_ms: f64, fade_duration_ms: u64) -> f32 {
        let Some(started) = self.fade_started_ms else {
            return 1.0;
        };
        if fade_duration_ms == 0 {
            return 0.0;
        }
        let t = ((now_ms - started) / fade_duration_ms as f64).clamp(0.0, 1.0);
        (1.0 - t) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drizzle_core::OverlayConfig;
    use drizzle_physics::PhysicsWorld;

    fn particle(now_ms: f64) -> Particle {
        let mut world = PhysicsWorld::new();
        let body = ParticleBody::insert(
            &mut world,
            Vec2::new(10.0, 10.0),
            40.0,
            Vec2::ZERO,
            0.0,
            &OverlayConfig::default(),
        );
        Particle::new(ParticleId::new(), body, "💧".into(), 40.0, Vec2::new(10.0, 10.0), now_ms)
    }

    #[test]
    fn test_opacity_ramp() {
        let mut p = particle(0.0);
        assert_eq!(p.opacity(500.0, 1000), 1.0);
        p.fade_started_ms = Some(1000.0);
        assert!((p.opacity(1500.0, 1000) - 0.5).abs() < 1e-6);
        assert_eq!(p.opacity(2500.0, 1000), 0.0);
        assert_eq!(p.opacity(1000.0, 0), 0.0);
    }

    #[test]
    fn test_age_never_negative() {
        let p = particle(100.0);
        assert_eq!(p.age_ms(50.0), 0.0);
        assert_eq!(p.age_ms(350.0), 250.0);
    }
}
