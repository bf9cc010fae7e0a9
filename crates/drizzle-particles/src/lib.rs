//! Drizzle Particles - particle lifecycle and visual projection
//!
//! Particles pair a Rapier body with a sprite on some `RenderSurface`.
//! `ParticleManager` spawns, ages, fades and removes them; `projection` turns
//! their state into renderable attributes without touching the simulation.

pub mod lifecycle;
pub mod particle;
pub mod projection;
pub mod spawn;
pub mod surface;
pub mod timers;

pub use lifecycle::{ParticleManager, TickReport, BOUNCE_EFFECT_MS, BOUNDS_MARGIN};
pub use particle::Particle;
pub use projection::project;
pub use spawn::{SpawnEvent, SpawnRequest};
pub use surface::{HeadlessSprite, HeadlessSurface, RenderSurface, SpriteAttributes, SpriteHandle};
pub use timers::{TimerKind, TimerQueue};
