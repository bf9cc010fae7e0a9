//! Conversion of event magnitudes into particle counts
//!
//! The thresholds are user-facing tuning constants, so the formulas stay
//! plain divisor/multiplier rules.

use crate::OverlayConfig;

/// Particles for a batch of likes:
/// `clamp(floor(likes / like_count_divisor), like_min_emojis, like_max_emojis)`
pub fn like_particle_count(config: &OverlayConfig, likes: u32) -> u32 {
    let divisor = config.like_count_divisor.max(1.0);
    let raw = (likes as f32 / divisor).floor() as u32;
    raw.clamp(config.like_min_emojis, config.like_max_emojis.max(config.like_min_emojis))
}

/// Particles for a gift worth `coins`:
/// `clamp(floor(coins * gift_coin_multiplier), gift_min_emojis, gift_max_emojis)`
pub fn gift_particle_count(config: &OverlayConfig, coins: u32) -> u32 {
    let raw = (coins as f32 * config.gift_coin_multiplier.max(0.0)).floor() as u32;
    raw.clamp(config.gift_min_emojis, config.gift_max_emojis.max(config.gift_min_emojis))
}

/// Particles for a burst spawn: `floor(count * intensity)`
pub fn burst_count(count: u32, intensity: f32) -> u32 {
    if !intensity.is_finite() || intensity <= 0.0 {
        return 0;
    }
    (count as f64 * intensity as f64).floor() as u32
}
