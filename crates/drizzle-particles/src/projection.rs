//! Particle state -> renderable attributes
//!
//! Everything here is a pure function of a particle and the configuration.
//! Nothing reads or writes the physics world.

use crate::particle::Particle;
use crate::surface::SpriteAttributes;
use drizzle_core::{ColorMode, OverlayConfig};

/// Static color themes are recomputed at most this often
pub const THEME_REFRESH_MS: f64 = 100.0;
/// Hue degrees per second at `rainbow_speed == 1.0`
const RAINBOW_DEGREES_PER_SEC: f64 = 120.0;

/// Filter chain for a static color theme, or None when theming is off
pub fn theme_filter(mode: ColorMode, intensity: f32) -> Option<String> {
    let i = intensity.clamp(0.0, 1.0);
    let filter = match mode {
        ColorMode::Off => return None,
        ColorMode::Warm => format!(
            "sepia({:.2}) saturate({:.2}) hue-rotate(-10deg)",
            0.6 * i,
            1.0 + 0.5 * i
        ),
        ColorMode::Cool => format!(
            "hue-rotate({:.0}deg) saturate({:.2})",
            180.0 * i,
            1.0 + 0.3 * i
        ),
        ColorMode::Neon => format!(
            "saturate({:.2}) brightness({:.2}) contrast({:.2})",
            1.0 + 2.0 * i,
            1.0 + 0.3 * i,
            1.0 + 0.2 * i
        ),
        ColorMode::Pastel => format!(
            "saturate({:.2}) brightness({:.2})",
            1.0 - 0.5 * i,
            1.0 + 0.2 * i
        ),
    };
    Some(filter)
}

/// Hue rotation for rainbow mode at `now_ms`
pub fn rainbow_filter(now_ms: f64, speed: f32) -> String {
    let hue = (now_ms / 1000.0 * RAINBOW_DEGREES_PER_SEC * speed as f64).rem_euclid(360.0);
    format!("hue-rotate({:.0}deg)", hue)
}

/// Glow tinted with a per-user color
pub fn color_override_filter(color: &str) -> String {
    format!("drop-shadow(0 0 6px {color}) brightness(1.1)")
}

/// Whether the particle's cached theme filter is stale
pub fn needs_theme_refresh(particle: &Particle, now_ms: f64) -> bool {
    match particle.theme_refreshed_ms {
        None => true,
        Some(at) => now_ms - at >= THEME_REFRESH_MS,
    }
}

/// Compose the filter chain in fixed precedence: pixelation, then a per-user
/// color override (which ends the chain), then rainbow, then the cached
/// static theme.
pub fn compose_filter(particle: &Particle, config: &OverlayConfig, now_ms: f64) -> String {
    let mut parts: Vec<String> = Vec::new();

    if config.pixel_enabled {
        parts.push("contrast(1.15) saturate(1.1)".to_string());
    }

    if let Some(color) = &particle.color_override {
        parts.push(color_override_filter(color));
        return parts.join(" ");
    }

    if config.rainbow_enabled {
        parts.push(rainbow_filter(now_ms, config.rainbow_speed));
    }

    if config.color_mode != ColorMode::Off {
        let cached = particle
            .theme_filter
            .clone()
            .or_else(|| theme_filter(config.color_mode, config.color_intensity));
        if let Some(theme) = cached {
            parts.push(theme);
        }
    }

    parts.join(" ")
}

/// Map a particle onto the attributes its sprite should show
pub fn project(particle: &Particle, config: &OverlayConfig, now_ms: f64) -> SpriteAttributes {
    let half = particle.size / 2.0;
    SpriteAttributes {
        x: particle.position.x - half,
        y: particle.position.y - half,
        size: particle.size,
        rotation: particle.rotation(),
        opacity: particle.opacity(now_ms, config.emoji_fade_duration_ms),
        filter: compose_filter(particle, config, now_ms),
        pixel_size: config.pixel_enabled.then_some(config.pixel_size),
        bouncing: particle.bouncing,
    }
}
