//! Drizzle Core - Foundational types for the Drizzle overlay engine
//!
//! This crate provides the types that all other Drizzle crates depend on:
//! - `OverlayConfig` / `ConfigStore` - tunable parameters with an override layer
//! - `UserSymbolMap` - per-user preferred symbols
//! - `ParticleId` - stable particle identifiers
//! - `Vec2`, `SurfaceSize` - 2D screen-space types
//! - spawn scaling rules and a small deterministic PRNG
//! - Error types and Result alias

mod config;
mod error;
mod id;
pub mod rand;
pub mod scaling;
mod symbols;
mod types;

pub use config::{
    ColorMode, ConfigDiff, ConfigStore, FidelityOverrides, OverlayConfig, WindDirection,
};
pub use error::{DrizzleError, Result};
pub use id::ParticleId;
pub use rand::OverlayRng;
pub use symbols::UserSymbolMap;
pub use types::{SurfaceSize, Vec2};
