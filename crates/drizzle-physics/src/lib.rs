//! Drizzle Physics - Rapier 2D integration
//!
//! Provides the rigid-body side of the overlay:
//! - `PhysicsWorld` - wraps the Rapier pipeline, body/collider sets and a
//!   detachable collision-event channel
//! - `BoundaryManager` - floor and side walls sized to the rendering surface
//! - `ParticleBody` - the dynamic ball body behind each particle
//! - `Wind` - fixed or randomly gusting horizontal acceleration
//! - `PhysicsStepper` - clamped per-frame step with wind, damping and floor
//!   contact reporting

pub mod body;
pub mod boundary;
pub mod stepper;
pub mod wind;
pub mod world;

pub use body::{BodyPose, ParticleBody};
pub use boundary::BoundaryManager;
pub use stepper::{PhysicsStepper, StepReport};
pub use wind::Wind;
pub use world::PhysicsWorld;

pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
