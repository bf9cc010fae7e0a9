//! Drizzle Runtime - frame timing, inbound events and the performance governor
//!
//! Provides the per-frame machinery around the simulation:
//! - `FrameClock` - elapsed time and frame deltas
//! - `OverlayEvent` / `EventBus` - notifications queued from any thread
//! - `PerformanceGovernor` - rolling fps window and fidelity levels

pub mod clock;
pub mod event;
pub mod event_bus;
pub mod governor;

pub use clock::FrameClock;
pub use event::{parse_spawn, parse_user_symbols, OverlayEvent};
pub use event_bus::{EventBus, EventSender};
pub use governor::{FidelityLevel, PerformanceGovernor, Transition};
