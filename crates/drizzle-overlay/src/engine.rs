//! Overlay engine: the frame loop tying configuration, physics, particles,
//! the governor and a render surface together.
//!
//! Per frame, in order: drain and apply queued events, step physics, fire
//! floor bounces, run the lifecycle tick, feed the governor, render.

use crate::source::ConfigSource;
use drizzle_core::scaling::{gift_particle_count, like_particle_count};
use drizzle_core::{ConfigDiff, ConfigStore, DrizzleError, OverlayConfig, Result, SurfaceSize};
use drizzle_particles::{ParticleManager, RenderSurface, SpawnEvent, TickReport};
use drizzle_physics::{BoundaryManager, PhysicsStepper, PhysicsWorld};
use drizzle_runtime::{
    EventBus, EventSender, FidelityLevel, FrameClock, OverlayEvent, PerformanceGovernor, Transition,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

/// Snapshot of engine state for debug panels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugReadout {
    pub particle_count: usize,
    pub fidelity: FidelityLevel,
    /// Frame rate of the last frame
    pub fps: Option<f32>,
    /// Rolling average the governor is judging
    pub average_fps: Option<f32>,
    pub body_count: usize,
    pub enabled: bool,
    pub floor_enabled: bool,
    pub frame: u64,
    pub elapsed_ms: f64,
}

/// What one frame did
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Simulated time slice in seconds
    pub dt: f32,
    pub events: usize,
    pub spawned: usize,
    pub bounces: usize,
    pub tick: TickReport,
    pub transition: Option<Transition>,
    /// Particles whose sprite could not be updated this frame
    pub render_skipped: usize,
}

/// Which parts of a source refresh were applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub config: bool,
    pub user_symbols: bool,
}

pub struct OverlayEngine<S: RenderSurface> {
    store: ConfigStore,
    world: PhysicsWorld,
    boundaries: BoundaryManager,
    stepper: PhysicsStepper,
    particles: ParticleManager,
    governor: PerformanceGovernor,
    clock: FrameClock,
    bus: EventBus,
    surface: S,
    /// Last size reported through `resize`; wins over sizes in replaced configs
    host_size: Option<SurfaceSize>,
    torn_down: bool,
}

impl<S: RenderSurface> OverlayEngine<S> {
    pub fn new(config: OverlayConfig, surface: S) -> Self {
        Self::with_seed(config, surface, 0x0D12_221E)
    }

    /// Create an engine whose randomness is fully determined by `seed`
    pub fn with_seed(config: OverlayConfig, surface: S, seed: u32) -> Self {
        let store = ConfigStore::new(config);
        let mut world = PhysicsWorld::new();
        world.set_gravity_scale(store.effective().physics_gravity_y);
        let boundaries = BoundaryManager::new(&mut world, store.effective());
        info!(
            "Overlay engine ready ({}x{}, max {} particles)",
            store.effective().width,
            store.effective().height,
            store.effective().max_emojis_on_screen
        );

        Self {
            store,
            world,
            boundaries,
            stepper: PhysicsStepper::new(seed),
            particles: ParticleManager::new(seed.rotate_left(16) ^ 0x9E37_79B9),
            governor: PerformanceGovernor::new(),
            clock: FrameClock::new(),
            bus: EventBus::new(),
            surface,
            host_size: None,
            torn_down: false,
        }
    }

    /// Handle for queueing events from other threads
    pub fn sender(&self) -> EventSender {
        self.bus.sender()
    }

    /// Queue an event for the next frame
    pub fn push(&self, event: OverlayEvent) {
        self.bus.push(event);
    }

    /// Run one frame that took `dt_secs` of wall time
    pub fn frame(&mut self, dt_secs: f64) -> Result<FrameReport> {
        if self.torn_down {
            return Err(DrizzleError::TornDown);
        }
        self.clock.advance(dt_secs);
        self.run_frame()
    }

    /// Run one frame timed by the wall clock
    pub fn frame_realtime(&mut self) -> Result<FrameReport> {
        if self.torn_down {
            return Err(DrizzleError::TornDown);
        }
        self.clock.tick();
        self.run_frame()
    }

    fn run_frame(&mut self) -> Result<FrameReport> {
        let mut report = FrameReport::default();

        for event in self.bus.drain() {
            report.events += 1;
            report.spawned += self.handle_event(event);
            if self.torn_down {
                return Ok(report);
            }
        }

        let now_ms = self.clock.total_ms;
        let config = self.store.effective().clone();

        let bodies = self.particles.body_handles();
        let step = self.stepper.step(
            &mut self.world,
            &self.boundaries,
            &bodies,
            &config,
            self.clock.delta_time as f32,
        );
        report.dt = step.dt;
        report.bounces = self
            .particles
            .on_floor_contacts(&step.floor_contacts, &config, now_ms);
        report.tick = self.particles.tick(
            &mut self.world,
            &mut self.surface,
            &config,
            self.boundaries.size(),
            step.dt,
            now_ms,
        );

        if let Some(fps) = self.clock.fps() {
            self.governor.record(fps);
        }
        // Cadence follows wall time so slow hosts are still judged once a second
        if let Some(transition) = self.governor.evaluate(&mut self.store, self.clock.real_ms) {
            self.apply_diff(transition.diff);
            report.transition = Some(transition);
        }

        report.render_skipped =
            self.particles
                .render(&mut self.surface, self.store.effective(), now_ms);
        Ok(report)
    }

    /// Apply one event immediately. Returns the number of particles spawned.
    pub fn handle_event(&mut self, event: OverlayEvent) -> usize {
        if self.torn_down {
            debug!("Ignoring {} event after teardown", event.kind());
            return 0;
        }
        match event {
            OverlayEvent::Spawn(spawn) => self.spawn(&spawn),
            OverlayEvent::Likes { count, username } => {
                let n = like_particle_count(self.store.effective(), count);
                self.spawn(&SpawnEvent {
                    count: n,
                    username,
                    ..Default::default()
                })
            }
            OverlayEvent::Gift {
                coins,
                username,
                symbol,
            } => {
                let n = gift_particle_count(self.store.effective(), coins);
                self.spawn(&SpawnEvent {
                    count: n,
                    username,
                    symbol,
                    ..Default::default()
                })
            }
            OverlayEvent::ConfigUpdate(patch) => {
                match self.store.apply_patch(&patch) {
                    Ok(diff) => self.apply_diff(diff),
                    Err(e) => warn!("Ignoring configuration update: {}", e),
                }
                0
            }
            OverlayEvent::ConfigReplace(config) => {
                self.replace_config(*config);
                0
            }
            OverlayEvent::Toggle { enabled } => {
                self.store.set_enabled(enabled);
                info!("Overlay {}", if enabled { "enabled" } else { "disabled" });
                0
            }
            OverlayEvent::UserSymbols(symbols) => {
                debug!("User symbol map replaced ({} entries)", symbols.len());
                self.particles.set_user_symbols(symbols);
                0
            }
            OverlayEvent::Resize(size) => {
                self.resize(size);
                0
            }
            OverlayEvent::Teardown => {
                self.teardown();
                0
            }
        }
    }

    fn spawn(&mut self, event: &SpawnEvent) -> usize {
        let config = self.store.effective();
        if !config.enabled {
            debug!("Overlay disabled, dropping spawn of {}", event.count);
            return 0;
        }
        self.particles
            .handle_spawn_event(
                &mut self.world,
                &mut self.surface,
                config,
                event,
                self.clock.total_ms,
            )
            .len()
    }

    /// Record a new surface size; boundaries follow, particles are untouched
    pub fn resize(&mut self, size: SurfaceSize) {
        self.host_size = Some(size);
        let patch = json!({ "width": size.width, "height": size.height });
        match self.store.apply_patch(&patch) {
            Ok(diff) => self.apply_diff(diff),
            Err(e) => warn!("Ignoring resize: {}", e),
        }
    }

    /// Replace the whole configuration, keeping any host-reported size
    fn replace_config(&mut self, mut config: OverlayConfig) {
        if let Some(size) = self.host_size {
            config.width = size.width;
            config.height = size.height;
        }
        let diff = self.store.replace(config);
        self.apply_diff(diff);
    }

    /// Push configuration changes into the simulation
    fn apply_diff(&mut self, diff: ConfigDiff) {
        let config = self.store.effective();
        if diff.gravity_changed {
            self.world.set_gravity_scale(config.physics_gravity_y);
            self.world.wake_dynamic_bodies();
        }
        if diff.floor_changed {
            self.boundaries
                .set_floor_enabled(&mut self.world, config.floor_enabled);
        }
        if diff.surface_changed {
            self.boundaries
                .resize(&mut self.world, config.surface_size());
        }
        self.boundaries.apply_material(
            &mut self.world,
            config.physics_restitution,
            config.physics_friction,
        );
        if diff.material_changed {
            self.particles.apply_material(
                &mut self.world,
                config.physics_restitution,
                config.physics_friction,
            );
        }
    }

    /// Pull a fresh configuration and user symbol map from `source`.
    ///
    /// Each half is applied independently; a failed fetch keeps the current
    /// values.
    pub fn refresh_from(&mut self, source: &dyn ConfigSource) -> RefreshOutcome {
        let mut outcome = RefreshOutcome::default();
        if self.torn_down {
            return outcome;
        }

        match source.fetch_config() {
            Ok(config) => {
                self.replace_config(config);
                outcome.config = true;
            }
            Err(e) => warn!(
                "Config fetch from {} failed, keeping last known values: {}",
                source.name(),
                e
            ),
        }

        match source.fetch_user_symbols() {
            Ok(symbols) => {
                self.particles.set_user_symbols(symbols);
                outcome.user_symbols = true;
            }
            Err(e) => warn!(
                "User mapping fetch from {} failed, keeping last known values: {}",
                source.name(),
                e
            ),
        }
        outcome
    }

    /// Shut down in strict order: cancel timers, remove particles, detach
    /// collision listeners, then clear the world. Returns false if already
    /// torn down.
    pub fn teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        let timers = self.particles.cancel_all_timers();
        let removed = self.particles.clear(&mut self.world, &mut self.surface);
        self.world.detach_events();
        self.world.clear();
        self.torn_down = true;
        info!(
            "Overlay torn down ({} particles removed, {} timers cancelled)",
            removed, timers
        );
        true
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn readout(&self) -> DebugReadout {
        DebugReadout {
            particle_count: self.particles.live_count(),
            fidelity: self.governor.level(),
            fps: self.clock.fps(),
            average_fps: self.governor.average_fps(),
            body_count: self.world.body_count(),
            enabled: self.store.effective().enabled,
            floor_enabled: self.boundaries.floor_enabled(),
            frame: self.clock.frame_count(),
            elapsed_ms: self.clock.total_ms,
        }
    }

    /// Configuration the frame loop runs with, overrides applied
    pub fn config(&self) -> &OverlayConfig {
        self.store.effective()
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn particles(&self) -> &ParticleManager {
        &self.particles
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn boundaries(&self) -> &BoundaryManager {
        &self.boundaries
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Elapsed overlay time in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.clock.total_ms
    }
}
