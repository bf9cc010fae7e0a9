//! Particle lifecycle: spawn, age, fade, remove
//!
//! `ParticleManager` owns every live particle together with the body index
//! and the timer queue. All removal goes through `remove`, which cancels the
//! particle's timers before releasing its body and sprite, so a particle is
//! destroyed exactly once.

use crate::particle::Particle;
use crate::projection::{needs_theme_refresh, project, theme_filter};
use crate::spawn::{SpawnEvent, SpawnRequest};
use crate::surface::RenderSurface;
use crate::timers::{TimerKind, TimerQueue};
use bimap::BiMap;
use drizzle_core::scaling::burst_count;
use drizzle_core::{ColorMode, OverlayConfig, OverlayRng, ParticleId, SurfaceSize, UserSymbolMap, Vec2};
use drizzle_physics::{ParticleBody, PhysicsStepper, PhysicsWorld, RigidBodyHandle};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Particles further than this outside the surface are removed
pub const BOUNDS_MARGIN: f32 = 200.0;
/// How long the floor bounce effect shows
pub const BOUNCE_EFFECT_MS: f64 = 400.0;
/// Horizontal jitter applied to each particle of a multi-particle event
const SPAWN_JITTER_PX: f32 = 20.0;
/// Vertical distance between stagger rows
const STAGGER_PX: f32 = 30.0;
const STAGGER_ROWS: usize = 5;
/// Magnitude of the random initial velocity (px/s)
const SPAWN_SPEED: f32 = 60.0;
/// Magnitude of the random initial angular velocity (rad/s)
const SPAWN_SPIN: f32 = 2.0;
/// Used only when the configured symbol set is empty
const FALLBACK_SYMBOL: &str = "💧";

/// What happened during one lifecycle tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub faded: usize,
    pub removed_out_of_bounds: usize,
    pub removed_non_finite: usize,
    pub removed_after_fade: usize,
    pub evicted: usize,
}

/// Owns live particles and drives their lifecycle
pub struct ParticleManager {
    particles: HashMap<ParticleId, Particle>,
    /// Spawn order, oldest first
    order: VecDeque<ParticleId>,
    body_index: BiMap<ParticleId, RigidBodyHandle>,
    timers: TimerQueue,
    symbols: UserSymbolMap,
    rng: OverlayRng,
}

impl Default for ParticleManager {
    fn default() -> Self {
        Self::new(0xD122_1E00)
    }
}

impl ParticleManager {
    pub fn new(seed: u32) -> Self {
        Self {
            particles: HashMap::new(),
            order: VecDeque::new(),
            body_index: BiMap::new(),
            timers: TimerQueue::new(),
            symbols: UserSymbolMap::new(),
            rng: OverlayRng::new(seed),
        }
    }

    /// Replace the username -> symbol map. Existing particles keep their symbol.
    pub fn set_user_symbols(&mut self, symbols: UserSymbolMap) {
        self.symbols = symbols;
    }

    /// Spawn one particle at `request.x`/`request.y` in surface pixels.
    ///
    /// Evicts the oldest particles first if the cap would be exceeded. The
    /// sprite is created already positioned at the spawn point.
    pub fn spawn(
        &mut self,
        world: &mut PhysicsWorld,
        surface: &mut dyn RenderSurface,
        config: &OverlayConfig,
        request: SpawnRequest,
        now_ms: f64,
    ) -> ParticleId {
        let cap = config.max_emojis_on_screen.max(1);
        while self.particles.len() >= cap {
            if !self.evict_oldest(world, surface) {
                break;
            }
        }

        let symbol = self
            .symbols
            .resolve_or(request.username.as_deref(), &request.symbol_hint)
            .to_string();
        let position = Vec2::new(request.x, request.y);
        let size = request.size.filter(|s| s.is_finite() && *s > 0.0).unwrap_or_else(|| {
            self.rng
                .range(config.emoji_min_size_px, config.emoji_max_size_px)
        });
        let velocity = Vec2::new(
            self.rng.signed(SPAWN_SPEED),
            self.rng.range(0.0, SPAWN_SPEED),
        );
        let spin = self.rng.signed(SPAWN_SPIN);

        let body = ParticleBody::insert(world, position, size, velocity, spin, config);
        let id = ParticleId::new();
        let mut particle = Particle::new(id, body, symbol, size, position, now_ms);
        particle.username = request.username;
        particle.color_override = request.color;

        let initial = project(&particle, config, now_ms);
        particle.sprite = surface.create_sprite(&particle.symbol, &initial);
        if particle.sprite.is_none() {
            debug!("Surface refused sprite for particle {:?}", id);
        }

        debug!(
            "Spawned {:?} '{}' at ({:.0}, {:.0}) size {:.0}",
            id, particle.symbol, request.x, request.y, size
        );
        self.body_index.insert(id, body.body);
        self.order.push_back(id);
        self.particles.insert(id, particle);
        id
    }

    /// Expand a spawn notification into individual particles.
    ///
    /// An event `x` within `[0, 1]` is a fraction of the surface width. The
    /// count is capped at `max_emojis_on_screen`, since anything beyond it
    /// would be evicted within the same call.
    pub fn handle_spawn_event(
        &mut self,
        world: &mut PhysicsWorld,
        surface: &mut dyn RenderSurface,
        config: &OverlayConfig,
        event: &SpawnEvent,
        now_ms: f64,
    ) -> Vec<ParticleId> {
        let requested = if event.burst {
            burst_count(event.count, config.superfan_burst_intensity)
        } else {
            event.count
        };
        let count = (requested as usize).min(config.max_emojis_on_screen.max(1));
        if count < requested as usize {
            debug!("Spawn of {} capped to {}", requested, count);
        }

        let base_y = event.y.filter(|y| y.is_finite()).unwrap_or(0.0);
        let explicit_x = event
            .x
            .filter(|x| x.is_finite())
            .map(|x| normalize_x(x, config.width));

        let mut spawned = Vec::with_capacity(count);
        for i in 0..count {
            let symbol_hint = match &event.symbol {
                Some(symbol) => symbol.clone(),
                None => self
                    .rng
                    .pick(config.active_symbols())
                    .cloned()
                    .unwrap_or_else(|| FALLBACK_SYMBOL.to_string()),
            };
            let mut x = explicit_x.unwrap_or_else(|| self.rng.range(0.0, config.width));
            if count > 1 {
                x += self.rng.signed(SPAWN_JITTER_PX);
            }
            let y = base_y - (i % STAGGER_ROWS) as f32 * STAGGER_PX;

            let request = SpawnRequest {
                symbol_hint,
                x,
                y,
                size: None,
                username: event.username.clone(),
                color: event.color.clone(),
            };
            spawned.push(self.spawn(world, surface, config, request, now_ms));
        }
        spawned
    }

    /// Start fading a particle out. Returns false if it is unknown or already
    /// fading.
    pub fn fade_out(&mut self, id: ParticleId, config: &OverlayConfig, now_ms: f64) -> bool {
        let Some(particle) = self.particles.get_mut(&id) else {
            return false;
        };
        if particle.fading {
            return false;
        }
        particle.fading = true;
        particle.fade_started_ms = Some(now_ms);
        self.timers.schedule(
            id,
            TimerKind::FadeComplete,
            now_ms + config.emoji_fade_duration_ms as f64,
        );
        true
    }

    /// Destroy a particle: cancel its timers, then release its index entry,
    /// body and sprite. Returns false if it was already removed.
    pub fn remove(
        &mut self,
        world: &mut PhysicsWorld,
        surface: &mut dyn RenderSurface,
        id: ParticleId,
    ) -> bool {
        let Some(mut particle) = self.particles.remove(&id) else {
            return false;
        };
        self.timers.cancel_all(id);
        self.body_index.remove_by_left(&id);
        self.order.retain(|p| *p != id);

        particle.body.release(world);
        if let Some(sprite) = particle.sprite.take() {
            surface.release_sprite(sprite);
        }
        debug!("Removed {:?}", id);
        true
    }

    fn evict_oldest(&mut self, world: &mut PhysicsWorld, surface: &mut dyn RenderSurface) -> bool {
        match self.order.front().copied() {
            Some(oldest) => self.remove(world, surface, oldest),
            None => false,
        }
    }

    /// Evict oldest-first until at most `cap` particles remain
    pub fn enforce_cap(
        &mut self,
        world: &mut PhysicsWorld,
        surface: &mut dyn RenderSurface,
        cap: usize,
    ) -> usize {
        let mut evicted = 0;
        while self.particles.len() > cap {
            if !self.evict_oldest(world, surface) {
                break;
            }
            evicted += 1;
        }
        evicted
    }

    /// Trigger the one-shot bounce effect for bodies that just hit the floor.
    ///
    /// Returns how many particles started bouncing.
    pub fn on_floor_contacts(
        &mut self,
        contacts: &[RigidBodyHandle],
        config: &OverlayConfig,
        now_ms: f64,
    ) -> usize {
        if !config.bounce_effect_enabled {
            return 0;
        }
        let mut started = 0;
        for handle in contacts {
            let Some(id) = self.body_index.get_by_right(handle).copied() else {
                continue;
            };
            let Some(particle) = self.particles.get_mut(&id) else {
                continue;
            };
            if particle.bounce_triggered {
                continue;
            }
            particle.bounce_triggered = true;
            particle.bouncing = true;
            self.timers
                .schedule(id, TimerKind::BounceEnd, now_ms + BOUNCE_EFFECT_MS);
            started += 1;
        }
        started
    }

    /// Per-frame lifecycle pass after the physics step.
    ///
    /// Syncs poses, accumulates spin, removes non-finite or out-of-bounds
    /// particles, starts fades on expiry, fires due timers and enforces the
    /// cap.
    pub fn tick(
        &mut self,
        world: &mut PhysicsWorld,
        surface: &mut dyn RenderSurface,
        config: &OverlayConfig,
        bounds: SurfaceSize,
        dt: f32,
        now_ms: f64,
    ) -> TickReport {
        let mut report = TickReport::default();
        let spin = PhysicsStepper::spin_increment(config, dt);
        let lifetime = config.emoji_lifetime_ms as f64;

        let mut non_finite = Vec::new();
        let mut out_of_bounds = Vec::new();
        let mut expired = Vec::new();

        for id in &self.order {
            let Some(particle) = self.particles.get_mut(id) else {
                continue;
            };
            let Some(pose) = particle.body.pose(world) else {
                non_finite.push(*id);
                continue;
            };
            if !pose.position.is_finite() || !pose.angle.is_finite() {
                non_finite.push(*id);
                continue;
            }
            particle.position = pose.position;
            particle.physics_angle = pose.angle;
            particle.spin += spin;

            if !bounds.contains_with_margin(pose.position, BOUNDS_MARGIN) {
                out_of_bounds.push(*id);
            } else if !particle.fading && particle.age_ms(now_ms) > lifetime {
                expired.push(*id);
            }
        }

        for id in non_finite {
            if self.remove(world, surface, id) {
                report.removed_non_finite += 1;
            }
        }
        for id in out_of_bounds {
            if self.remove(world, surface, id) {
                report.removed_out_of_bounds += 1;
            }
        }
        for id in expired {
            if self.fade_out(id, config, now_ms) {
                report.faded += 1;
            }
        }

        for (id, kind) in self.timers.take_due(now_ms) {
            match kind {
                TimerKind::FadeComplete => {
                    if self.remove(world, surface, id) {
                        report.removed_after_fade += 1;
                    }
                }
                TimerKind::BounceEnd => {
                    if let Some(particle) = self.particles.get_mut(&id) {
                        particle.bouncing = false;
                    }
                }
            }
        }

        report.evicted = self.enforce_cap(world, surface, config.max_emojis_on_screen);
        report
    }

    /// Push every particle's attributes to its sprite.
    ///
    /// Particles without a sprite, or whose sprite the surface no longer
    /// knows, are skipped for this frame. Returns how many were skipped.
    pub fn render(
        &mut self,
        surface: &mut dyn RenderSurface,
        config: &OverlayConfig,
        now_ms: f64,
    ) -> usize {
        let mut skipped = 0;
        for id in &self.order {
            let Some(particle) = self.particles.get_mut(id) else {
                continue;
            };

            if config.color_mode == ColorMode::Off {
                particle.theme_filter = None;
            } else if needs_theme_refresh(particle, now_ms) {
                particle.theme_filter = theme_filter(config.color_mode, config.color_intensity);
                particle.theme_refreshed_ms = Some(now_ms);
            }

            let Some(sprite) = particle.sprite else {
                skipped += 1;
                continue;
            };
            let attributes = project(particle, config, now_ms);
            if !surface.update_sprite(sprite, &attributes) {
                skipped += 1;
            }
        }
        skipped
    }

    /// Re-apply collider material to every live particle
    pub fn apply_material(&self, world: &mut PhysicsWorld, restitution: f32, friction: f32) {
        for particle in self.particles.values() {
            particle.body.apply_material(world, restitution, friction);
        }
    }

    /// Cancel every pending timer without touching particles
    pub fn cancel_all_timers(&mut self) -> usize {
        let pending = self.timers.len();
        self.timers.clear();
        pending
    }

    /// Remove every particle, oldest first. Returns how many were removed.
    pub fn clear(&mut self, world: &mut PhysicsWorld, surface: &mut dyn RenderSurface) -> usize {
        self.cancel_all_timers();
        let ids: Vec<ParticleId> = self.order.iter().copied().collect();
        ids.into_iter()
            .filter(|id| self.remove(world, surface, *id))
            .count()
    }

    pub fn live_count(&self) -> usize {
        self.particles.len()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(&id)
    }

    /// Particles in spawn order, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.order.iter().filter_map(|id| self.particles.get(id))
    }

    pub fn body_handles(&self) -> Vec<RigidBodyHandle> {
        self.order
            .iter()
            .filter_map(|id| self.body_index.get_by_left(id).copied())
            .collect()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

/// Treat `x` within `[0, 1]` as a fraction of the surface width
fn normalize_x(x: f32, width: f32) -> f32 {
    if (0.0..=1.0).contains(&x) {
        x * width
    } else {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{HeadlessSurface, SpriteAttributes, SpriteHandle};
    use rapier2d::prelude::Vector;

    struct Fixture {
        world: PhysicsWorld,
        surface: HeadlessSurface,
        manager: ParticleManager,
        config: OverlayConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(OverlayConfig::default())
        }

        fn with_config(config: OverlayConfig) -> Self {
            Self {
                world: PhysicsWorld::new(),
                surface: HeadlessSurface::new(),
                manager: ParticleManager::new(7),
                config,
            }
        }

        fn spawn_event(&mut self, event: SpawnEvent, now_ms: f64) -> Vec<ParticleId> {
            self.manager
                .handle_spawn_event(&mut self.world, &mut self.surface, &self.config, &event, now_ms)
        }

        fn tick(&mut self, now_ms: f64) -> TickReport {
            let bounds = self.config.surface_size();
            self.manager.tick(
                &mut self.world,
                &mut self.surface,
                &self.config,
                bounds,
                1.0 / 60.0,
                now_ms,
            )
        }
    }

    /// A surface that cannot allocate sprites
    struct ExhaustedSurface;

    impl RenderSurface for ExhaustedSurface {
        fn create_sprite(&mut self, _: &str, _: &SpriteAttributes) -> Option<SpriteHandle> {
            None
        }
        fn update_sprite(&mut self, _: SpriteHandle, _: &SpriteAttributes) -> bool {
            false
        }
        fn release_sprite(&mut self, _: SpriteHandle) -> bool {
            false
        }
        fn sprite_count(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_plain_event_spawns_exact_count() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(20), 0.0);
        assert_eq!(ids.len(), 20);
        assert_eq!(f.manager.live_count(), 20);
        assert_eq!(f.surface.sprite_count(), 20);
        assert_eq!(f.world.body_count(), 20);
    }

    #[test]
    fn test_burst_multiplies_count() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(20).burst(), 0.0);
        assert_eq!(ids.len(), 60);

        f.config.superfan_burst_intensity = 1.5;
        let ids = f.spawn_event(SpawnEvent::new(3).burst(), 0.0);
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_cap_evicts_oldest_first() {
        let mut f = Fixture::with_config(OverlayConfig {
            max_emojis_on_screen: 5,
            ..Default::default()
        });
        let first = f.spawn_event(SpawnEvent::new(3), 0.0);
        let second = f.spawn_event(SpawnEvent::new(5), 10.0);
        assert_eq!(f.manager.live_count(), 5);
        assert_eq!(f.surface.sprite_count(), 5);
        assert_eq!(f.world.body_count(), 5);
        for id in &first {
            assert!(f.manager.get(*id).is_none());
        }
        let live: Vec<ParticleId> = f.manager.iter().map(|p| p.id).collect();
        assert_eq!(live, second);
    }

    #[test]
    fn test_oversized_count_is_capped() {
        let mut f = Fixture::with_config(OverlayConfig {
            max_emojis_on_screen: 25,
            ..Default::default()
        });
        let ids = f.spawn_event(SpawnEvent::new(u32::MAX), 0.0);
        assert_eq!(ids.len(), 25);
        assert_eq!(f.manager.live_count(), 25);
        assert_eq!(f.surface.created(), 25);

        let ids = f.spawn_event(SpawnEvent::new(u32::MAX / 2).burst(), 0.0);
        assert_eq!(ids.len(), 25);
        assert_eq!(f.manager.live_count(), 25);
    }

    #[test]
    fn test_lowering_cap_evicts_on_next_tick() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(10), 0.0);
        f.config.max_emojis_on_screen = 4;
        let report = f.tick(16.0);
        assert_eq!(report.evicted, 6);
        let live: Vec<ParticleId> = f.manager.iter().map(|p| p.id).collect();
        assert_eq!(live, ids[6..].to_vec());
    }

    #[test]
    fn test_sprite_created_at_spawn_point() {
        let mut f = Fixture::new();
        let request = SpawnRequest {
            size: Some(40.0),
            ..SpawnRequest::at("💧", 300.0, 100.0)
        };
        let id = f
            .manager
            .spawn(&mut f.world, &mut f.surface, &f.config, request, 0.0);
        let handle = f.manager.get(id).and_then(|p| p.sprite).unwrap();
        let sprite = f.surface.sprite(handle).unwrap();
        assert_eq!(sprite.initial.x, 280.0);
        assert_eq!(sprite.initial.y, 80.0);
        assert_eq!(sprite.updates, 0);
    }

    #[test]
    fn test_x_fraction_is_scaled_to_width() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(1).with_position(0.5, 10.0), 0.0);
        let p = f.manager.get(ids[0]).unwrap();
        assert!((p.position.x - 640.0).abs() < 1e-3);
        assert_eq!(p.position.y, 10.0);
    }

    #[test]
    fn test_left_edge_stays_near_left_edge() {
        for seed in 1..200 {
            let mut f = Fixture::new();
            f.manager = ParticleManager::new(seed);
            let ids = f.spawn_event(SpawnEvent::new(10).with_position(0.0, 0.0), 0.0);
            for id in ids {
                let x = f.manager.get(id).unwrap().position.x;
                assert!(x.abs() <= SPAWN_JITTER_PX, "seed {seed}: x={x}");
            }
        }
    }

    #[test]
    fn test_stagger_and_defaults() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(6).with_position(400.0, 0.0), 0.0);
        let ys: Vec<f32> = ids.iter().map(|id| f.manager.get(*id).unwrap().position.y).collect();
        assert_eq!(ys, vec![0.0, -30.0, -60.0, -90.0, -120.0, 0.0]);
        for id in &ids {
            let p = f.manager.get(*id).unwrap();
            assert!((p.position.x - 400.0).abs() <= SPAWN_JITTER_PX);
            assert!(p.size >= f.config.emoji_min_size_px && p.size <= f.config.emoji_max_size_px);
            assert!(f.config.emoji_set.contains(&p.symbol));
        }
    }

    #[test]
    fn test_user_symbol_lookup() {
        let mut f = Fixture::new();
        let map: UserSymbolMap = [("Alice".to_string(), "🦊".to_string())]
            .into_iter()
            .collect::<HashMap<_, _>>()
            .into();
        f.manager.set_user_symbols(map);

        let ids = f.spawn_event(SpawnEvent::new(1).with_symbol("💧").with_username("alice"), 0.0);
        assert_eq!(f.manager.get(ids[0]).unwrap().symbol, "🦊");

        let ids = f.spawn_event(SpawnEvent::new(1).with_symbol("💧").with_username("bob"), 0.0);
        assert_eq!(f.manager.get(ids[0]).unwrap().symbol, "💧");
    }

    #[test]
    fn test_fade_and_remove_are_idempotent() {
        let mut f = Fixture::new();
        let id = f.spawn_event(SpawnEvent::new(1), 0.0)[0];

        assert!(f.manager.fade_out(id, &f.config, 100.0));
        assert!(!f.manager.fade_out(id, &f.config, 200.0));
        assert_eq!(f.manager.pending_timers(), 1);

        assert!(f.manager.remove(&mut f.world, &mut f.surface, id));
        assert!(!f.manager.remove(&mut f.world, &mut f.surface, id));
        assert!(!f.manager.fade_out(id, &f.config, 300.0));
        assert_eq!(f.manager.pending_timers(), 0);
        assert_eq!(f.surface.released(), 1);
        assert_eq!(f.world.body_count(), 0);
        assert!(f.manager.body_handles().is_empty());
    }

    #[test]
    fn test_lifetime_then_fade_then_removal() {
        let mut f = Fixture::new();
        let id = f.spawn_event(SpawnEvent::new(1).with_position(640.0, 100.0), 0.0)[0];
        let lifetime = f.config.emoji_lifetime_ms as f64;
        let fade = f.config.emoji_fade_duration_ms as f64;

        assert_eq!(f.tick(lifetime - 1.0).faded, 0);
        let report = f.tick(lifetime + 1.0);
        assert_eq!(report.faded, 1);
        assert!(f.manager.get(id).unwrap().fading);

        assert_eq!(f.tick(lifetime + fade).removed_after_fade, 0);
        assert_eq!(f.tick(lifetime + 1.0 + fade).removed_after_fade, 1);
        assert!(f.manager.get(id).is_none());
        assert_eq!(f.surface.sprite_count(), 0);
    }

    #[test]
    fn test_out_of_bounds_and_non_finite_removed() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(3).with_position(640.0, 100.0), 0.0);
        let far = f.manager.get(ids[0]).unwrap().body.body;
        let broken = f.manager.get(ids[1]).unwrap().body.body;
        f.world
            .get_rigid_body_mut(far)
            .unwrap()
            .set_translation(Vector::new(640.0, 720.0 + BOUNDS_MARGIN + 1.0), false);
        f.world
            .get_rigid_body_mut(broken)
            .unwrap()
            .set_translation(Vector::new(f32::NAN, 100.0), false);

        let report = f.tick(16.0);
        assert_eq!(report.removed_out_of_bounds, 1);
        assert_eq!(report.removed_non_finite, 1);
        assert_eq!(f.manager.live_count(), 1);
        assert!(f.manager.get(ids[2]).is_some());
        assert_eq!(f.world.body_count(), 1);
    }

    #[test]
    fn test_bounce_fires_once() {
        let mut f = Fixture::new();
        let id = f.spawn_event(SpawnEvent::new(1), 0.0)[0];
        let body = f.manager.get(id).unwrap().body.body;

        assert_eq!(f.manager.on_floor_contacts(&[body], &f.config, 100.0), 1);
        assert_eq!(f.manager.on_floor_contacts(&[body], &f.config, 150.0), 0);
        assert!(f.manager.get(id).unwrap().bouncing);

        f.tick(100.0 + BOUNCE_EFFECT_MS);
        let p = f.manager.get(id).unwrap();
        assert!(!p.bouncing);
        assert!(p.bounce_triggered);
    }

    #[test]
    fn test_bounce_disabled() {
        let mut f = Fixture::with_config(OverlayConfig {
            bounce_effect_enabled: false,
            ..Default::default()
        });
        let id = f.spawn_event(SpawnEvent::new(1), 0.0)[0];
        let body = f.manager.get(id).unwrap().body.body;
        assert_eq!(f.manager.on_floor_contacts(&[body], &f.config, 0.0), 0);
        assert!(!f.manager.get(id).unwrap().bounce_triggered);
    }

    #[test]
    fn test_missing_sprite_is_skipped() {
        let mut world = PhysicsWorld::new();
        let mut surface = ExhaustedSurface;
        let mut manager = ParticleManager::new(1);
        let config = OverlayConfig::default();
        let ids = manager.handle_spawn_event(&mut world, &mut surface, &config, &SpawnEvent::new(3), 0.0);
        assert_eq!(ids.len(), 3);
        assert_eq!(manager.render(&mut surface, &config, 16.0), 3);
        assert_eq!(manager.live_count(), 3);
    }

    #[test]
    fn test_render_updates_sprites() {
        let mut f = Fixture::with_config(OverlayConfig {
            color_mode: ColorMode::Neon,
            ..Default::default()
        });
        let id = f.spawn_event(SpawnEvent::new(1).with_position(200.0, 200.0), 0.0)[0];
        assert_eq!(f.manager.render(&mut f.surface, &f.config, 16.0), 0);

        let p = f.manager.get(id).unwrap();
        assert_eq!(p.theme_refreshed_ms, Some(16.0));
        let sprite = f.surface.sprite(p.sprite.unwrap()).unwrap();
        assert_eq!(sprite.updates, 1);
        assert!(sprite.current.filter.contains("saturate"));
    }

    #[test]
    fn test_clear_cancels_timers_and_releases() {
        let mut f = Fixture::new();
        let ids = f.spawn_event(SpawnEvent::new(4), 0.0);
        f.manager.fade_out(ids[0], &f.config, 0.0);
        assert_eq!(f.manager.clear(&mut f.world, &mut f.surface), 4);
        assert_eq!(f.manager.pending_timers(), 0);
        assert_eq!(f.manager.live_count(), 0);
        assert_eq!(f.surface.sprite_count(), 0);
        assert_eq!(f.world.body_count(), 0);
    }
}
