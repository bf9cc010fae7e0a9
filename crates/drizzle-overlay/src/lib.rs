//! Drizzle Overlay - the engine facade
//!
//! `OverlayEngine` owns the configuration store, physics world, boundaries,
//! particles, governor and a render surface, and runs them once per frame.
//! `ConfigSource` implementations feed it configuration from files or an
//! HTTP service.

pub mod engine;
pub mod source;

pub use engine::{DebugReadout, FrameReport, OverlayEngine, RefreshOutcome};
pub use source::{ConfigSource, FileSource, HttpSource};
