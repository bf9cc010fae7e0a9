//! Horizontal wind

use drizzle_core::{OverlayConfig, OverlayRng, WindDirection};

/// Horizontal acceleration in px/s² per unit of `wind_strength`
pub const WIND_ACCEL_PER_STRENGTH: f32 = 4.0;
/// Fraction of the bound the auto gust may move per 60 Hz frame
const GUST_STEP: f32 = 0.05;

/// Wind state. In auto mode the acceleration performs a slow random walk
/// clamped to a bound derived from the configured strength.
#[derive(Debug, Clone, Default)]
pub struct Wind {
    gust: f32,
}

impl Wind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the wind and return the horizontal acceleration for this frame
    pub fn sample(&mut self, config: &OverlayConfig, rng: &mut OverlayRng, dt: f32) -> f32 {
        if !config.wind_enabled {
            self.gust = 0.0;
            return 0.0;
        }
        let bound = config.wind_strength * WIND_ACCEL_PER_STRENGTH;
        match config.wind_direction {
            WindDirection::Left => -bound,
            WindDirection::Right => bound,
            WindDirection::Auto => {
                let step = bound * GUST_STEP * (dt * 60.0);
                self.gust = (self.gust + rng.signed(step)).clamp(-bound, bound);
                self.gust
            }
        }
    }
}
